//! Pilot: programmatic interaction with a headless Application.
//!
//! The `Pilot` owns an [`Application`] and a virtual clock. Input goes
//! through the same normalization as platform input, timers only advance
//! when the test says so, and frames paint into a [`RecordingSurface`].

use std::time::{Duration, Instant};

use crate::app::{AppConfig, Application};
use crate::error::Result;
use crate::event::input::button;
use crate::event::{Key, KeyEvent, RawInput, RawKey, RawPointer};
use crate::geometry::Rect;
use crate::tree::{WidgetData, WidgetId};

use super::RecordingSurface;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless application driver for testing.
///
/// # Examples
///
/// ```ignore
/// use easel::testing::Pilot;
/// use easel::geometry::Rect;
///
/// let mut pilot = Pilot::new(320, 240);
/// let win = pilot.window(Rect::new(0, 0, 100, 100));
/// pilot.click(10, 10);
/// assert_eq!(pilot.app().manager().target(), Some(win));
/// ```
pub struct Pilot {
    app: Application,
    now: Instant,
}

impl Pilot {
    /// Create a headless application with the given canvas size.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(AppConfig::new().with_size(width, height))
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            app: Application::new(config),
            now: Instant::now(),
        }
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Create a window and advance the clock past the registration delay.
    pub fn window(&mut self, rect: Rect) -> WidgetId {
        let id = self.app.create_window(rect, self.now);
        let delay = self.app.config().window_delay;
        self.advance(delay);
        id
    }

    /// Create a window without waiting for it to register.
    pub fn window_pending(&mut self, rect: Rect) -> WidgetId {
        self.app.create_window(rect, self.now)
    }

    pub fn add_child(&mut self, parent: WidgetId, data: WidgetData) -> Result<WidgetId> {
        self.app.manager_mut().tree_mut().insert_child(parent, data)
    }

    // ── Clock ────────────────────────────────────────────────────────

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the clock forward and run timers.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.app.tick(self.now);
    }

    // ── Pointer ──────────────────────────────────────────────────────

    pub fn press(&mut self, x: i32, y: i32) -> bool {
        self.send(RawInput::PointerDown(RawPointer::at(x, y)))
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> bool {
        self.send(RawInput::PointerMove(RawPointer::at(x, y)))
    }

    pub fn release(&mut self, x: i32, y: i32) -> bool {
        self.send(RawInput::PointerUp(RawPointer::at(x, y)))
    }

    /// Press and release at the same point.
    pub fn click(&mut self, x: i32, y: i32) {
        self.press(x, y);
        self.release(x, y);
    }

    /// Press at `from`, move to `to`, release at `to`.
    pub fn drag(&mut self, from: (i32, i32), to: (i32, i32)) {
        self.press(from.0, from.1);
        self.move_to(to.0, to.1);
        self.release(to.0, to.1);
    }

    pub fn double_click(&mut self, x: i32, y: i32) -> bool {
        self.send(RawInput::DoubleClick(RawPointer::at(x, y)))
    }

    pub fn context_menu(&mut self, x: i32, y: i32) -> bool {
        self.send(RawInput::ContextMenu(RawPointer::at(x, y).with_button(button::SECONDARY)))
    }

    pub fn wheel(&mut self, delta: f64) -> bool {
        self.send(RawInput::wheel(delta))
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        self.send(RawInput::KeyDown(RawKey::new(key)))
    }

    pub fn key_up(&mut self, key: KeyEvent) -> bool {
        self.send(RawInput::KeyUp(RawKey::new(key)))
    }

    /// Key down then key up, no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.key_down(KeyEvent::plain(key));
        self.key_up(KeyEvent::plain(key));
    }

    // ── Raw ──────────────────────────────────────────────────────────

    /// Feed any raw input at the current virtual time.
    pub fn send(&mut self, input: RawInput) -> bool {
        self.app.handle_input(input, self.now)
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.send(RawInput::Resize { width, height });
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Paint one frame, requested or not.
    pub fn frame(&mut self) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        self.app.on_frame(&mut surface);
        surface
    }

    /// Paint only if a frame was requested.
    pub fn frame_if_requested(&mut self) -> Option<RecordingSurface> {
        let mut surface = RecordingSurface::new();
        self.app.paint_if_requested(&mut surface).then_some(surface)
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Application {
        &mut self.app
    }
}

// ===========================================================================
// Tests
// ===========================================================================

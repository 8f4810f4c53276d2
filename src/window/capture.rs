//! Window-level dispatch: click detection and pointer grab.
//!
//! A window records where the pointer went down and where it last was; a
//! release close to the press is a click. While a window has a grab widget,
//! every pointer event skips hit testing and goes straight to it.

use log::debug;

use crate::error::{Error, Result};
use crate::event::KeyEvent;
use crate::geometry::Point;
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{Context, Gesture, WidgetKind};

/// Press-to-release travel (per axis) below which a release is a click.
pub const CLICK_THRESHOLD: i32 = 5;

/// Per-window pointer bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowData {
    pub(crate) grab: Option<WidgetId>,
    pub(crate) pointer_down: bool,
    pub(crate) down_position: Point,
    pub(crate) up_position: Point,
    pub(crate) last_position: Point,
}

impl WindowData {
    /// The widget capturing pointer input, if any.
    pub fn grab(&self) -> Option<WidgetId> {
        self.grab
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn down_position(&self) -> Point {
        self.down_position
    }

    pub fn up_position(&self) -> Point {
        self.up_position
    }

    pub fn last_position(&self) -> Point {
        self.last_position
    }

    /// Whether the pointer stayed within [`CLICK_THRESHOLD`] of the press.
    pub fn is_clicked(&self) -> bool {
        self.last_position.within(self.down_position, CLICK_THRESHOLD)
    }
}

impl WidgetTree {
    pub fn window(&self, id: WidgetId) -> Result<&WindowData> {
        self.try_get(id)?
            .kind
            .as_window()
            .ok_or(Error::WrongKind { id, expected: "window" })
    }

    fn window_mut(&mut self, id: WidgetId) -> Option<&mut WindowData> {
        match &mut self.get_mut(id)?.kind {
            WidgetKind::Window(w) => Some(w),
            _ => None,
        }
    }

    /// Route all of the window's pointer input to `widget` and register the
    /// window with the manager's grab list.
    pub fn window_grab(&mut self, ctx: &mut Context, window: WidgetId, widget: WidgetId) {
        if let Some(w) = self.window_mut(window) {
            w.grab = Some(widget);
            ctx.grab_window(window);
        }
    }

    /// Clear the grab widget and drop the window from the grab list.
    pub fn window_ungrab(&mut self, ctx: &mut Context, window: WidgetId) {
        if let Some(w) = self.window_mut(window) {
            w.grab = None;
        }
        ctx.ungrab_window(window);
    }

    /// The live grab widget of `window`.
    pub fn window_grab_widget(&self, window: WidgetId) -> Option<WidgetId> {
        self.window(window)
            .ok()?
            .grab
            .filter(|&g| self.contains(g))
    }

    pub fn window_is_clicked(&self, window: WidgetId) -> bool {
        self.window(window).is_ok_and(WindowData::is_clicked)
    }

    // -----------------------------------------------------------------------
    // Pointer
    // -----------------------------------------------------------------------

    pub(crate) fn window_pointer_down(&mut self, ctx: &mut Context, window: WidgetId, point: Point) {
        if let Some(w) = self.window_mut(window) {
            w.pointer_down = true;
            w.down_position = point;
            w.last_position = point;
        }
        match self.window_grab_widget(window) {
            Some(grab) => self.on_pointer_down(ctx, grab, point),
            None => self.widget_pointer_down(ctx, window, point),
        }
        ctx.post_redraw();
    }

    pub(crate) fn window_pointer_move(&mut self, ctx: &mut Context, window: WidgetId, point: Point) {
        if let Some(w) = self.window_mut(window) {
            w.last_position = point;
        }
        match self.window_grab_widget(window) {
            Some(grab) => self.on_pointer_move(ctx, grab, point),
            None => self.widget_pointer_move(ctx, window, point),
        }
        ctx.post_redraw();
    }

    /// The release point counts as the last position, so a press and release
    /// without moves still measures the real travel.
    pub(crate) fn window_pointer_up(&mut self, ctx: &mut Context, window: WidgetId, point: Point) {
        if let Some(w) = self.window_mut(window) {
            w.up_position = point;
            w.last_position = point;
        }
        match self.window_grab_widget(window) {
            Some(grab) => self.on_pointer_up(ctx, grab, point),
            None => self.widget_pointer_up(ctx, window, point),
        }
        if let Some(w) = self.window_mut(window) {
            w.pointer_down = false;
        }
        ctx.post_redraw();
    }

    /// Deliver a gesture to the grab widget, or the deepest widget under the
    /// point.
    pub(crate) fn window_gesture(&mut self, window: WidgetId, gesture: Gesture, point: Point) {
        let target = self
            .window_grab_widget(window)
            .or_else(|| self.find_target_widget_ex(window, point, true));
        match target {
            Some(t) => self.fire_gesture(t, gesture, point),
            None => debug!("{gesture:?} hit nothing"),
        }
    }

    // -----------------------------------------------------------------------
    // Keyboard and wheel
    // -----------------------------------------------------------------------

    pub(crate) fn window_key(&mut self, ctx: &mut Context, window: WidgetId, key: KeyEvent, down: bool) {
        match (self.window_grab_widget(window), down) {
            (Some(grab), true) => self.on_key_down(ctx, grab, key),
            (Some(grab), false) => self.on_key_up(ctx, grab, key),
            (None, true) => self.widget_key_down(ctx, window, key),
            (None, false) => self.widget_key_up(ctx, window, key),
        }
    }

    pub(crate) fn window_wheel(&mut self, ctx: &mut Context, window: WidgetId, delta: f64) -> bool {
        match self.window_grab_widget(window) {
            Some(grab) => self.on_wheel(ctx, grab, delta),
            None => self.widget_wheel(ctx, window, delta),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

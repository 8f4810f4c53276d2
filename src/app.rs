//! Application: configuration and the root object owning every collaborator.
//!
//! [`Application`] ties together the window manager, the events manager,
//! the theme and the frame signal. It has no platform of its own; a host
//! feeds it [`RawInput`], calls [`tick`](Application::tick) regularly and
//! paints when a frame was requested. [`driver::run`](crate::render::driver::run)
//! is such a host.

use std::time::{Duration, Instant};

use crate::event::{EventsManager, RawInput, DEFAULT_LONG_PRESS};
use crate::geometry::{Rect, Size};
use crate::render::{FrameSignal, RedrawScheduler, Surface};
use crate::theme::{Theme, ThemeProvider};
use crate::tree::WidgetId;
use crate::widget::scroll_view::DEFAULT_BAR_SIZE;
use crate::window::manager::DEFAULT_REGISTRATION_DELAY;
use crate::window::WindowManager;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Canvas size in pixels.
    pub size: Size,
    /// Subtracted from client coordinates before scaling.
    pub input_offset: (i32, i32),
    /// Client to canvas scale, applied after the offset.
    pub input_scale: (f64, f64),
    /// Request a new frame after every frame.
    pub max_fps: bool,
    pub paint_enabled: bool,
    /// Tick rate of the driver loop.
    pub fps: u32,
    /// Delay between creating a window and registering it.
    pub window_delay: Duration,
    pub long_press: Duration,
    /// Default scroll bar thickness for new scroll views.
    pub scroll_bar_size: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            size: Size::new(800, 600),
            input_offset: (0, 0),
            input_scale: (1.0, 1.0),
            max_fps: false,
            paint_enabled: true,
            fps: 60,
            window_delay: DEFAULT_REGISTRATION_DELAY,
            long_press: DEFAULT_LONG_PRESS,
            scroll_bar_size: DEFAULT_BAR_SIZE,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_input_offset(mut self, x: i32, y: i32) -> Self {
        self.input_offset = (x, y);
        self
    }

    pub fn with_input_scale(mut self, x: f64, y: f64) -> Self {
        self.input_scale = (x, y);
        self
    }

    pub fn with_max_fps(mut self, on: bool) -> Self {
        self.max_fps = on;
        self
    }

    pub fn with_paint_enabled(mut self, enabled: bool) -> Self {
        self.paint_enabled = enabled;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_window_delay(mut self, delay: Duration) -> Self {
        self.window_delay = delay;
        self
    }

    pub fn with_long_press(mut self, duration: Duration) -> Self {
        self.long_press = duration;
        self
    }

    pub fn with_scroll_bar_size(mut self, size: i32) -> Self {
        self.scroll_bar_size = size;
        self
    }

    /// Time between driver ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The root object: one per canvas.
pub struct Application {
    manager: WindowManager,
    events: EventsManager,
    theme: Box<dyn ThemeProvider>,
    frames: FrameSignal,
    config: AppConfig,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let frames = FrameSignal::new();
        let mut scheduler = RedrawScheduler::new(frames.clone());
        scheduler.set_paint_enabled(config.paint_enabled);
        let mut manager = WindowManager::new(scheduler, config.size);
        manager.set_input_offset(config.input_offset.0, config.input_offset.1);
        manager.set_input_scale(config.input_scale.0, config.input_scale.1);
        manager.set_registration_delay(config.window_delay);
        manager.set_scroll_bar_size(config.scroll_bar_size);
        manager.set_max_fps_mode(config.max_fps);

        Self {
            manager,
            events: EventsManager::new(config.long_press),
            theme: Box::new(Theme::new()),
            frames,
            config,
        }
    }

    pub fn with_theme(mut self, theme: impl ThemeProvider + 'static) -> Self {
        self.set_theme(theme);
        self
    }

    pub fn set_theme(&mut self, theme: impl ThemeProvider + 'static) {
        self.theme = Box::new(theme);
        self.manager.context_mut().post_redraw();
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn manager(&self) -> &WindowManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut WindowManager {
        &mut self.manager
    }

    pub fn events(&self) -> &EventsManager {
        &self.events
    }

    /// Create a window; it becomes hit-testable on the first
    /// [`tick`](Self::tick) after the configured delay.
    pub fn create_window(&mut self, rect: Rect, now: Instant) -> WidgetId {
        self.manager.create_window(rect, now)
    }

    /// Feed one platform event. Returns whether it reached the widgets.
    pub fn handle_input(&mut self, input: RawInput, now: Instant) -> bool {
        match input {
            RawInput::Resize { width, height } => {
                self.manager.resize(width, height);
                false
            }
            other => self.events.handle(other, now, &mut self.manager),
        }
    }

    /// Advance timers: deferred window registration and long press.
    pub fn tick(&mut self, now: Instant) {
        self.manager.register_due_windows(now);
        self.events.poll_long_press(now, &mut self.manager);
    }

    /// Whether a frame has been requested since the last paint.
    pub fn frame_requested(&self) -> bool {
        self.frames.is_requested()
    }

    /// Paint a frame unconditionally.
    pub fn on_frame(&mut self, surface: &mut dyn Surface) {
        self.frames.take();
        self.manager.on_frame(surface, self.theme.as_ref());
    }

    /// Paint a frame if one was requested. Returns whether it painted.
    pub fn paint_if_requested(&mut self, surface: &mut dyn Surface) -> bool {
        if !self.frames.take() {
            return false;
        }
        self.manager.on_frame(surface, self.theme.as_ref());
        true
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

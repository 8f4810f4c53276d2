//! Shared dispatch state.
//!
//! [`Context`] holds what every widget handler may touch besides the tree:
//! the redraw scheduler, the manager's pointer-down flag, the tips widget,
//! the pending cursor change, and the list of grabbing windows. The window
//! manager owns it and lends it to tree operations.

use log::debug;

use crate::render::RedrawScheduler;
use crate::tree::{Cursor, WidgetId};

pub struct Context {
    pub(crate) scheduler: RedrawScheduler,
    pub(crate) pointer_down: bool,
    pub(crate) tips: Option<WidgetId>,
    pub(crate) cursor: Option<Cursor>,
    pub(crate) grab_windows: Vec<WidgetId>,
}

impl Context {
    pub fn new(scheduler: RedrawScheduler) -> Self {
        Self {
            scheduler,
            pointer_down: false,
            tips: None,
            cursor: None,
            grab_windows: Vec::new(),
        }
    }

    pub fn post_redraw(&mut self) {
        self.scheduler.post_redraw();
    }

    /// Whether a pointer button is held, as tracked by the window manager.
    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RedrawScheduler {
        &mut self.scheduler
    }

    /// The widget whose tooltip should be drawn.
    pub fn tips(&self) -> Option<WidgetId> {
        self.tips
    }

    pub(crate) fn set_tips(&mut self, id: WidgetId) {
        self.tips = Some(id);
    }

    pub(crate) fn request_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    /// Take the cursor change requested since the last call.
    pub fn take_cursor(&mut self) -> Option<Cursor> {
        self.cursor.take()
    }

    /// Windows capturing all pointer input, oldest first.
    pub fn grab_windows(&self) -> &[WidgetId] {
        &self.grab_windows
    }

    pub(crate) fn grab_window(&mut self, window: WidgetId) {
        if !self.grab_windows.contains(&window) {
            debug!("window grab registered");
            self.grab_windows.push(window);
        }
    }

    pub(crate) fn ungrab_window(&mut self, window: WidgetId) {
        self.grab_windows.retain(|&w| w != window);
    }

    /// Drop every reference to widgets in `removed`.
    pub(crate) fn forget(&mut self, removed: &[WidgetId]) {
        if self.tips.is_some_and(|t| removed.contains(&t)) {
            self.tips = None;
        }
        self.grab_windows.retain(|w| !removed.contains(w));
    }
}

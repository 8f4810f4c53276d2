//! Widget records: WidgetId, WidgetData, Handlers, Cursor.

use std::fmt;

use slotmap::new_key_type;

use crate::error::CallbackError;
use crate::event::KeyEvent;
use crate::geometry::{Point, Rect};
use crate::render::{DisplayMode, Surface};
use crate::widget::{WidgetKind, WidgetState};
use crate::window::WindowData;

new_key_type! {
    /// Stable handle to a widget in the arena. Copy, lightweight (u64).
    ///
    /// Handles of destroyed widgets are never reused for new widgets, so a
    /// stale handle simply fails to resolve.
    pub struct WidgetId;
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Pointer cursor shape requested from the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Text,
    Move,
    Crosshair,
    NotAllowed,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Click callback. The only callback whose failure is tolerated and logged.
pub type ClickHandler = Box<dyn FnMut(WidgetId, Point) -> Result<(), CallbackError>>;
/// Pointer callback (down/move/up, double-click, context menu, long press).
pub type PointerHandler = Box<dyn FnMut(WidgetId, Point)>;
pub type KeyHandler = Box<dyn FnMut(WidgetId, KeyEvent)>;
pub type WheelHandler = Box<dyn FnMut(WidgetId, f64)>;
pub type StateHandler = Box<dyn FnMut(WidgetId, WidgetState)>;
/// Paint hook, called in the widget's local coordinate space.
pub type PaintHook = Box<dyn FnMut(WidgetId, &mut dyn Surface)>;
pub type RemovedHandler = Box<dyn FnMut(WidgetId)>;

/// Optional user callbacks attached to a widget.
#[derive(Default)]
pub struct Handlers {
    pub click: Option<ClickHandler>,
    pub pointer_down: Option<PointerHandler>,
    pub pointer_move: Option<PointerHandler>,
    pub pointer_up: Option<PointerHandler>,
    pub double_click: Option<PointerHandler>,
    pub context_menu: Option<PointerHandler>,
    pub long_press: Option<PointerHandler>,
    pub key_down: Option<KeyHandler>,
    pub key_up: Option<KeyHandler>,
    pub wheel: Option<WheelHandler>,
    pub state_changed: Option<StateHandler>,
    pub before_paint: Option<PaintHook>,
    pub after_paint: Option<PaintHook>,
    pub removed: Option<RemovedHandler>,
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = [
            ("click", self.click.is_some()),
            ("pointer_down", self.pointer_down.is_some()),
            ("pointer_move", self.pointer_move.is_some()),
            ("pointer_up", self.pointer_up.is_some()),
            ("double_click", self.double_click.is_some()),
            ("context_menu", self.context_menu.is_some()),
            ("long_press", self.long_press.is_some()),
            ("key_down", self.key_down.is_some()),
            ("key_up", self.key_up.is_some()),
            ("wheel", self.wheel.is_some()),
            ("state_changed", self.state_changed.is_some()),
            ("before_paint", self.before_paint.is_some()),
            ("after_paint", self.after_paint.is_some()),
            ("removed", self.removed.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        f.debug_tuple("Handlers").field(&set).finish()
    }
}

// ---------------------------------------------------------------------------
// WidgetData
// ---------------------------------------------------------------------------

/// Data associated with a single widget.
#[derive(Debug)]
pub struct WidgetData {
    /// Type tag (e.g. "window", "button"). Also the default theme key.
    pub type_name: String,
    /// Optional name used by [`WidgetTree::lookup`](super::WidgetTree::lookup).
    pub name: Option<String>,
    /// Position and size relative to the parent.
    pub rect: Rect,
    pub state: WidgetState,
    pub visible: bool,
    pub enabled: bool,
    pub selectable: bool,
    pub selected: bool,
    /// Overrides `type_name` when looking up the theme.
    pub theme_key: Option<String>,
    /// Hover tooltip text.
    pub tips: Option<String>,
    pub cursor: Cursor,
    /// Border width used when the style has a line color.
    pub line_width: f64,
    /// How a background image is fitted into the rect.
    pub image_display: DisplayMode,
    /// Draw the hovered/active child after its siblings.
    pub paint_focus_later: bool,
    pub(crate) needs_relayout: bool,
    pub kind: WidgetKind,
    pub handlers: Handlers,
}

impl WidgetData {
    /// Create a plain widget with the given type tag and sensible defaults.
    pub fn new(type_name: impl Into<String>, rect: Rect) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            rect,
            state: WidgetState::Normal,
            visible: true,
            enabled: true,
            selectable: false,
            selected: false,
            theme_key: None,
            tips: None,
            cursor: Cursor::Default,
            line_width: 1.0,
            image_display: DisplayMode::NinePatch,
            paint_focus_later: false,
            needs_relayout: true,
            kind: WidgetKind::Plain,
            handlers: Handlers::default(),
        }
    }

    /// Create the record for a top-level window.
    pub fn window(rect: Rect) -> Self {
        let mut data = Self::new("window", rect);
        data.kind = WidgetKind::Window(WindowData::default());
        data
    }

    /// The key used for theme lookups.
    pub fn theme_key(&self) -> &str {
        self.theme_key.as_deref().unwrap_or(&self.type_name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_theme_key(mut self, key: impl Into<String>) -> Self {
        self.theme_key = Some(key.into());
        self
    }

    pub fn with_tips(mut self, tips: impl Into<String>) -> Self {
        self.tips = Some(tips.into());
        self
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_image_display(mut self, mode: DisplayMode) -> Self {
        self.image_display = mode;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn paint_focus_later(mut self, later: bool) -> Self {
        self.paint_focus_later = later;
        self
    }

    pub fn on_click(
        mut self,
        f: impl FnMut(WidgetId, Point) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.handlers.click = Some(Box::new(f));
        self
    }

    pub fn on_pointer_down(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.pointer_down = Some(Box::new(f));
        self
    }

    pub fn on_pointer_move(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.pointer_move = Some(Box::new(f));
        self
    }

    pub fn on_pointer_up(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.pointer_up = Some(Box::new(f));
        self
    }

    pub fn on_double_click(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.double_click = Some(Box::new(f));
        self
    }

    pub fn on_context_menu(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.context_menu = Some(Box::new(f));
        self
    }

    pub fn on_long_press(mut self, f: impl FnMut(WidgetId, Point) + 'static) -> Self {
        self.handlers.long_press = Some(Box::new(f));
        self
    }

    pub fn on_key_down(mut self, f: impl FnMut(WidgetId, KeyEvent) + 'static) -> Self {
        self.handlers.key_down = Some(Box::new(f));
        self
    }

    pub fn on_key_up(mut self, f: impl FnMut(WidgetId, KeyEvent) + 'static) -> Self {
        self.handlers.key_up = Some(Box::new(f));
        self
    }

    pub fn on_wheel(mut self, f: impl FnMut(WidgetId, f64) + 'static) -> Self {
        self.handlers.wheel = Some(Box::new(f));
        self
    }

    pub fn on_state_changed(mut self, f: impl FnMut(WidgetId, WidgetState) + 'static) -> Self {
        self.handlers.state_changed = Some(Box::new(f));
        self
    }

    pub fn on_before_paint(mut self, f: impl FnMut(WidgetId, &mut dyn Surface) + 'static) -> Self {
        self.handlers.before_paint = Some(Box::new(f));
        self
    }

    pub fn on_after_paint(mut self, f: impl FnMut(WidgetId, &mut dyn Surface) + 'static) -> Self {
        self.handlers.after_paint = Some(Box::new(f));
        self
    }

    pub fn on_removed(mut self, f: impl FnMut(WidgetId) + 'static) -> Self {
        self.handlers.removed = Some(Box::new(f));
        self
    }
}

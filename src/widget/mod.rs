//! Widget behavior: state machine, hit testing, dispatch, scrolling.
//!
//! Widgets are records in the [`WidgetTree`](crate::tree::WidgetTree); their
//! behavior is a closed set of kinds dispatched by `match` on [`WidgetKind`].

pub mod context;
pub mod dispatch;
pub mod scroll_bar;
pub mod scroll_view;
pub mod state;

pub use context::Context;
pub use dispatch::Gesture;
pub use scroll_bar::{Orientation, ScrollBarData, DRAGGER_MIN, DRAGGER_INSET};
pub use scroll_view::{ScrollType, ScrollViewData};
pub use state::{style_state, WidgetState};

use crate::window::WindowData;

/// Kind-specific data and behavior of a widget.
#[derive(Debug, Default)]
pub enum WidgetKind {
    /// Generic container/leaf with the default dispatch.
    #[default]
    Plain,
    /// Top-level root with click detection and pointer grab.
    Window(WindowData),
    ScrollBar(ScrollBarData),
    ScrollView(ScrollViewData),
}

impl WidgetKind {
    pub fn as_window(&self) -> Option<&WindowData> {
        match self {
            WidgetKind::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_scroll_bar(&self) -> Option<&ScrollBarData> {
        match self {
            WidgetKind::ScrollBar(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_scroll_view(&self) -> Option<&ScrollViewData> {
        match self {
            WidgetKind::ScrollView(v) => Some(v),
            _ => None,
        }
    }
}

//! Widget arena: slotmap-backed tree with stable handles.

pub mod arena;
pub mod node;

pub use arena::WidgetTree;
pub use node::{
    ClickHandler, Cursor, Handlers, KeyHandler, PaintHook, PointerHandler, RemovedHandler,
    StateHandler, WheelHandler, WidgetData, WidgetId,
};

//! Windows and the window manager.
//!
//! A window is a root widget with click detection and a pointer grab; the
//! [`WindowManager`] owns the tree, orders the windows, routes normalized
//! input to the right one, and paints them on each frame.

pub mod capture;
pub mod manager;

pub use capture::{WindowData, CLICK_THRESHOLD};
pub use manager::{WindowManager, MANAGER_CLICK_THRESHOLD};

//! Error types.
//!
//! Missing hit-test targets are not errors; they are `None`. The errors here
//! cover API misuse (stale handles, asking a plain widget for scroll state) and
//! failures reported by user callbacks.

use crate::tree::WidgetId;

/// Errors returned by tree and manager operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle refers to a widget that was destroyed (or never existed).
    #[error("widget {0:?} does not exist")]
    StaleWidget(WidgetId),

    /// The widget exists but is not of the kind the operation needs.
    #[error("widget {id:?} is not a {expected}")]
    WrongKind {
        id: WidgetId,
        expected: &'static str,
    },

    /// Only root widgets can be registered as windows.
    #[error("widget {0:?} has a parent and cannot be used as a window")]
    NotARoot(WidgetId),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a click callback.
///
/// The dispatcher logs these and keeps processing input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

//! Input events: raw platform input, keys, normalization.

pub mod input;
pub mod manager;

pub use input::{from_crossterm, Key, KeyEvent, Modifiers, RawInput, RawKey, RawPointer};
pub use manager::{EventConsumer, EventsManager, DEFAULT_LONG_PRESS};

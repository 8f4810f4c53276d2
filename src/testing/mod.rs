//! Headless testing framework: Pilot, recording surface, manual frames.
//!
//! Use the [`Pilot`] to drive an [`Application`](crate::app::Application)
//! with a virtual clock. Use [`RecordingSurface`] to capture paint calls and
//! [`ManualFrames`] to count frame requests.

pub mod pilot;
pub mod recorder;

pub use pilot::Pilot;
pub use recorder::{Call, ManualFrames, RecordingSurface, CHAR_WIDTH};

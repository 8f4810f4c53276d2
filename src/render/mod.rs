//! Rendering: the surface contract, images, redraw scheduling, the paint
//! pipeline and the async frame driver.

pub mod driver;
pub mod image;
pub mod paint;
pub mod scheduler;
pub mod surface;

pub use image::{draw as draw_image, DisplayMode, ImageRef};
pub use scheduler::{FrameRequester, FrameSignal, RedrawScheduler};
pub use surface::Surface;

//! The drawing surface contract.
//!
//! A [`Surface`] is a stateful 2D drawing context with a transform/clip
//! stack, in the manner of an HTML canvas. The engine only calls it; a
//! backend (browser canvas, software rasterizer, test recorder) implements
//! it.

use crate::render::ImageRef;
use crate::tree::Cursor;
use crate::geometry::Rect;

/// Stateful 2D drawing context.
pub trait Surface {
    /// Push the current transform, clip and paint state.
    fn save(&mut self);
    /// Pop the state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    /// Intersect the clip region with the current path.
    fn clip(&mut self);

    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_fill_color(&mut self, color: &str);
    fn set_stroke_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    /// Width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;

    /// Copy `src` (in image pixels) of `image` into `dst` (in surface units).
    fn draw_image(&mut self, image: &ImageRef, src: Rect, dst: Rect);

    /// Change the pointer cursor shown over the surface.
    fn set_cursor(&mut self, _cursor: Cursor) {}
}

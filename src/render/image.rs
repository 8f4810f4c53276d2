//! Image handles and fitted drawing.
//!
//! An [`ImageRef`] names a bitmap the surface knows how to blit and carries
//! its natural size. [`draw`] maps it into a destination rect using one of
//! the [`DisplayMode`]s.

use log::trace;

use super::Surface;
use crate::geometry::Rect;

/// Opaque handle to a bitmap with known natural dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Backend key (file name, atlas entry, texture id).
    pub key: String,
    pub width: i32,
    pub height: i32,
}

impl ImageRef {
    pub fn new(key: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
        }
    }

    /// The whole image as a source rect.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// How an image is fitted into its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// Fixed corners and edges, stretched middle. The source is sliced into
    /// thirds on each axis.
    #[default]
    NinePatch,
    /// Uniform scale to fit, never enlarged, centered.
    AutoSizeDown,
}

/// Draw `image` into `dst` according to `mode`.
///
/// Images with no area draw nothing.
pub fn draw(surface: &mut dyn Surface, image: &ImageRef, mode: DisplayMode, dst: Rect) {
    if image.width <= 0 || image.height <= 0 || dst.is_empty() {
        trace!("skipping empty image {}", image.key);
        return;
    }
    match mode {
        DisplayMode::NinePatch => {
            for (src, to) in nine_patch(image.bounds(), dst) {
                surface.draw_image(image, src, to);
            }
        }
        DisplayMode::AutoSizeDown => {
            surface.draw_image(image, image.bounds(), fit_down(image, dst));
        }
    }
}

/// The destination rect for [`DisplayMode::AutoSizeDown`].
pub fn fit_down(image: &ImageRef, dst: Rect) -> Rect {
    let scale = (dst.width as f64 / image.width as f64)
        .min(dst.height as f64 / image.height as f64)
        .min(1.0);
    let width = (image.width as f64 * scale).floor() as i32;
    let height = (image.height as f64 * scale).floor() as i32;
    Rect::new(
        dst.x + (dst.width - width) / 2,
        dst.y + (dst.height - height) / 2,
        width,
        height,
    )
}

/// Source/destination pairs for a 9-patch blit, skipping empty slices.
///
/// Corners keep their size unless the destination is too small, in which
/// case they shrink to half the destination.
pub fn nine_patch(src: Rect, dst: Rect) -> Vec<(Rect, Rect)> {
    let src_cols = slices(src.x, src.width, src.width / 3);
    let src_rows = slices(src.y, src.height, src.height / 3);
    let dst_cols = slices(dst.x, dst.width, (src.width / 3).min(dst.width / 2));
    let dst_rows = slices(dst.y, dst.height, (src.height / 3).min(dst.height / 2));

    let mut out = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            let s = Rect::new(src_cols[col].0, src_rows[row].0, src_cols[col].1, src_rows[row].1);
            let d = Rect::new(dst_cols[col].0, dst_rows[row].0, dst_cols[col].1, dst_rows[row].1);
            if !s.is_empty() && !d.is_empty() {
                out.push((s, d));
            }
        }
    }
    out
}

/// Split `[start, start + len)` into (start, len) thirds with fixed outer
/// slices of `edge`.
fn slices(start: i32, len: i32, edge: i32) -> [(i32, i32); 3] {
    let middle = (len - 2 * edge).max(0);
    [
        (start, edge),
        (start + edge, middle),
        (start + edge + middle, edge),
    ]
}

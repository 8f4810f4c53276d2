//! Text layout: measurement and line breaking.
//!
//! Layout never touches a font directly. It asks a [`TextMeasure`] for the
//! width of candidate strings; a [`Surface`] can serve through
//! [`SurfaceMeasure`], tests use [`MonospaceMeasure`] or a closure.

pub mod wrap;

pub use wrap::{
    can_break_before, is_cjk, justify_text, segment, wrap_by_space, wrap_by_word, GapFill,
};

use crate::render::Surface;

// ---------------------------------------------------------------------------
// TextMeasure
// ---------------------------------------------------------------------------

/// Width of a string in the current font.
pub trait TextMeasure {
    fn measure(&mut self, text: &str) -> f64;
}

impl<F> TextMeasure for F
where
    F: FnMut(&str) -> f64,
{
    fn measure(&mut self, text: &str) -> f64 {
        self(text)
    }
}

/// Fixed-advance measurement. CJK ideographs take two advances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f64,
}

impl MonospaceMeasure {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&mut self, text: &str) -> f64 {
        text.chars()
            .map(|c| if is_cjk(c) { 2.0 } else { 1.0 })
            .sum::<f64>()
            * self.char_width
    }
}

/// Measures with whatever font is set on the surface.
pub struct SurfaceMeasure<'a>(pub &'a mut dyn Surface);

impl TextMeasure for SurfaceMeasure<'_> {
    fn measure(&mut self, text: &str) -> f64 {
        self.0.measure_text(text)
    }
}

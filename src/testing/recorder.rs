//! Recording doubles for the rendering seams.
//!
//! [`RecordingSurface`] logs every drawing call as a [`Call`] so tests can
//! assert on paint order. [`ManualFrames`] counts frame requests instead of
//! scheduling anything.

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Rect;
use crate::render::{FrameRequester, ImageRef, Surface};
use crate::tree::Cursor;

/// Width of every character as reported by [`RecordingSurface::measure_text`].
pub const CHAR_WIDTH: f64 = 6.0;

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Save,
    Restore,
    Translate(f64, f64),
    Clip,
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Rect(f64, f64, f64, f64),
    Arc(f64, f64, f64),
    Fill,
    Stroke,
    ClearRect(f64, f64, f64, f64),
    SetFillColor(String),
    SetStrokeColor(String),
    SetLineWidth(f64),
    SetFont(String),
    FillText { text: String, x: f64, y: f64 },
    DrawImage { key: String, src: Rect, dst: Rect },
    SetCursor(Cursor),
}

// ---------------------------------------------------------------------------
// RecordingSurface
// ---------------------------------------------------------------------------

/// A [`Surface`] that draws nothing and remembers everything.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<Call>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Current save/restore nesting. Zero after a balanced frame.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Texts drawn with `fill_text`, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.calls.push(Call::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.calls.push(Call::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.calls.push(Call::Translate(dx, dy));
    }

    fn clip(&mut self) {
        self.calls.push(Call::Clip);
    }

    fn begin_path(&mut self) {
        self.calls.push(Call::BeginPath);
    }

    fn close_path(&mut self) {
        self.calls.push(Call::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.calls.push(Call::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.calls.push(Call::LineTo(x, y));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(Call::Rect(x, y, width, height));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start_angle: f64, _end_angle: f64) {
        self.calls.push(Call::Arc(x, y, radius));
    }

    fn fill(&mut self) {
        self.calls.push(Call::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(Call::Stroke);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(Call::ClearRect(x, y, width, height));
    }

    fn set_fill_color(&mut self, color: &str) {
        self.calls.push(Call::SetFillColor(color.to_owned()));
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.calls.push(Call::SetStrokeColor(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.calls.push(Call::SetLineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.calls.push(Call::SetFont(font.to_owned()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.calls.push(Call::FillText {
            text: text.to_owned(),
            x,
            y,
        });
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * CHAR_WIDTH
    }

    fn draw_image(&mut self, image: &ImageRef, src: Rect, dst: Rect) {
        self.calls.push(Call::DrawImage {
            key: image.key.clone(),
            src,
            dst,
        });
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.calls.push(Call::SetCursor(cursor));
    }
}

// ---------------------------------------------------------------------------
// ManualFrames
// ---------------------------------------------------------------------------

/// A [`FrameRequester`] that only counts. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct ManualFrames {
    requests: Rc<Cell<u32>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame requests received so far.
    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

impl FrameRequester for ManualFrames {
    fn request_frame(&mut self) {
        self.requests.set(self.requests.get() + 1);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

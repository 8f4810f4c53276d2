//! Redraw coalescing.
//!
//! Any number of [`RedrawScheduler::post_redraw`] calls between two frames
//! produce a single frame request. The frame callback itself belongs to the
//! platform and is abstracted as a [`FrameRequester`].

use std::cell::Cell;
use std::rc::Rc;

use log::trace;

/// Platform hook for "call me back on the next animation frame".
pub trait FrameRequester {
    fn request_frame(&mut self);
}

/// A frame request flag shared between the scheduler and whatever loop
/// paints. The loop polls [`take`](FrameSignal::take) once per tick.
#[derive(Debug, Clone, Default)]
pub struct FrameSignal(Rc<Cell<bool>>);

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    /// Consume the pending request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl FrameRequester for FrameSignal {
    fn request_frame(&mut self) {
        self.0.set(true);
    }
}

/// Coalesces redraw requests into frame requests.
pub struct RedrawScheduler {
    frames: Box<dyn FrameRequester>,
    pending: u32,
    draw_count: u64,
    paint_enabled: bool,
    max_fps: bool,
    dirty: bool,
}

impl RedrawScheduler {
    pub fn new(frames: impl FrameRequester + 'static) -> Self {
        Self {
            frames: Box::new(frames),
            pending: 0,
            draw_count: 0,
            paint_enabled: true,
            max_fps: false,
            dirty: false,
        }
    }

    /// Ask for a repaint. Only the first request since the last frame reaches
    /// the platform.
    pub fn post_redraw(&mut self) {
        if !self.paint_enabled {
            return;
        }
        self.pending += 1;
        if self.pending < 2 {
            trace!("requesting frame");
            self.frames.request_frame();
        }
    }

    /// Ask for one more frame after the current one.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called when the frame fires, before painting.
    pub fn begin_frame(&mut self) {
        self.pending = 0;
        self.draw_count += 1;
    }

    /// Called after painting. Re-arms the frame if max-FPS mode is on or
    /// something was marked dirty.
    pub fn end_frame(&mut self) {
        if self.max_fps || std::mem::take(&mut self.dirty) {
            self.post_redraw();
        }
    }

    /// Requests posted since the last frame.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Frames painted so far.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn paint_enabled(&self) -> bool {
        self.paint_enabled
    }

    /// Enabling painting posts a redraw so the screen catches up.
    pub fn set_paint_enabled(&mut self, enabled: bool) {
        self.paint_enabled = enabled;
        if enabled {
            self.post_redraw();
        }
    }

    pub fn max_fps(&self) -> bool {
        self.max_fps
    }

    pub fn set_max_fps(&mut self, on: bool) {
        self.max_fps = on;
        if on {
            self.post_redraw();
        }
    }
}

//! Scroll bars: position tracking, dragger geometry, drag and paging.
//!
//! A bar's orientation follows its aspect ratio: wider than tall is
//! horizontal. The position is clamped to `[0, range - length]`, where
//! `length` is the bar's longer side.

use std::fmt;

use log::{debug, trace};

use super::{Context, WidgetKind, WidgetState};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::tree::{WidgetData, WidgetId, WidgetTree};

/// Smallest dragger length along the track.
pub const DRAGGER_MIN: f64 = 20.0;
/// Gap between the dragger and the track edges across the bar.
pub const DRAGGER_INSET: i32 = 2;
/// Range given to a freshly created bar.
pub const DEFAULT_SCROLL_RANGE: f64 = 100.0;

/// Callback fired with `(position, range)` whenever the position is set.
pub type ScrolledHandler = Box<dyn FnMut(f64, f64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn of(rect: Rect) -> Self {
        if rect.width > rect.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Per-bar scroll state.
pub struct ScrollBarData {
    pub(crate) range: f64,
    pub(crate) position: f64,
    pub(crate) dragger: Option<Rect>,
    pub(crate) dragging: bool,
    pub(crate) down_point: Point,
    pub(crate) saved_position: f64,
    pub(crate) on_scrolled: Option<ScrolledHandler>,
}

impl Default for ScrollBarData {
    fn default() -> Self {
        Self {
            range: DEFAULT_SCROLL_RANGE,
            position: 0.0,
            dragger: None,
            dragging: false,
            down_point: Point::ZERO,
            saved_position: 0.0,
            on_scrolled: None,
        }
    }
}

impl fmt::Debug for ScrollBarData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollBarData")
            .field("range", &self.range)
            .field("position", &self.position)
            .field("dragger", &self.dragger)
            .field("dragging", &self.dragging)
            .finish_non_exhaustive()
    }
}

impl ScrollBarData {
    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// The dragger rect in bar-local coordinates, once computed.
    pub fn dragger(&self) -> Option<Rect> {
        self.dragger
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Recompute the dragger for a bar occupying `rect`.
    ///
    /// The range is raised to at least the track length first.
    fn update_dragger(&mut self, rect: Rect) {
        let orientation = Orientation::of(rect);
        let track = match orientation {
            Orientation::Horizontal => rect.width,
            Orientation::Vertical => rect.height,
        } as f64;
        self.range = self.range.max(track);
        let percent = self.position / self.range;

        let length = DRAGGER_MIN.max((track * track / self.range).floor());
        let offset = (percent * track).max(0.0).min(track - length).floor() as i32;
        let length = length as i32;
        self.dragger = Some(match orientation {
            Orientation::Horizontal => Rect::new(
                offset,
                DRAGGER_INSET,
                length,
                rect.height - 2 * DRAGGER_INSET,
            ),
            Orientation::Vertical => Rect::new(
                DRAGGER_INSET,
                offset,
                rect.width - 2 * DRAGGER_INSET,
                length,
            ),
        });
    }
}

impl WidgetTree {
    /// Create a scroll bar as the topmost child of `parent`.
    pub fn insert_scroll_bar(&mut self, parent: WidgetId, type_name: &str, rect: Rect) -> Result<WidgetId> {
        let mut data = WidgetData::new(type_name, rect);
        let mut bar = ScrollBarData::default();
        bar.update_dragger(rect);
        data.kind = WidgetKind::ScrollBar(bar);
        self.insert_child(parent, data)
    }

    fn bar(&self, id: WidgetId) -> Result<&ScrollBarData> {
        self.try_get(id)?
            .kind
            .as_scroll_bar()
            .ok_or(Error::WrongKind { id, expected: "scroll bar" })
    }

    fn bar_mut(&mut self, id: WidgetId) -> Result<(Rect, &mut ScrollBarData)> {
        let data = self.try_get_mut(id)?;
        match &mut data.kind {
            WidgetKind::ScrollBar(bar) => Ok((data.rect, bar)),
            _ => Err(Error::WrongKind { id, expected: "scroll bar" }),
        }
    }

    pub fn scroll_bar(&self, id: WidgetId) -> Result<&ScrollBarData> {
        self.bar(id)
    }

    /// Set the scroll range and refresh the dragger.
    pub fn set_scroll_range(&mut self, id: WidgetId, range: f64) -> Result<()> {
        let (rect, bar) = self.bar_mut(id)?;
        bar.range = range;
        bar.update_dragger(rect);
        Ok(())
    }

    /// Clamp and store a new position, refresh the dragger, post a redraw and
    /// notify the scrolled callback. Out-of-range values are clamped, never
    /// rejected.
    pub fn set_scroll_position(&mut self, ctx: &mut Context, id: WidgetId, position: f64) -> Result<()> {
        let (rect, bar) = self.bar_mut(id)?;
        let length = rect.width.max(rect.height) as f64;
        bar.position = position.min(bar.range - length).max(0.0);
        bar.update_dragger(rect);
        trace!("scroll position {} of {}", bar.position, bar.range);
        let (position, range) = (bar.position, bar.range);
        if let Some(scrolled) = bar.on_scrolled.as_mut() {
            scrolled(position, range);
        }
        ctx.post_redraw();
        Ok(())
    }

    pub fn add_scroll_position(&mut self, ctx: &mut Context, id: WidgetId, delta: f64) -> Result<()> {
        let position = self.bar(id)?.position;
        self.set_scroll_position(ctx, id, position + delta)
    }

    pub fn set_on_scrolled(&mut self, id: WidgetId, f: impl FnMut(f64, f64) + 'static) -> Result<()> {
        self.bar_mut(id)?.1.on_scrolled = Some(Box::new(f));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pointer handling
    // -----------------------------------------------------------------------

    /// Grab the window, and start a drag if the press is on the dragger.
    pub(crate) fn scroll_bar_pointer_down(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        if let Some(window) = self.window_of(id) {
            self.window_grab(ctx, window, id);
        }
        let local = point - self.abs_position(id);
        let Ok((_, bar)) = self.bar_mut(id) else {
            return;
        };
        bar.down_point = point;
        let on_dragger = bar.dragger.is_some_and(|d| d.contains(local));
        if on_dragger {
            bar.dragging = true;
            bar.saved_position = bar.position;
        }
        let state = if on_dragger { WidgetState::Active } else { WidgetState::Normal };
        self.set_state(ctx, id, state, false);
    }

    /// Map pointer travel along the track to position travel.
    pub(crate) fn scroll_bar_pointer_move(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Ok((rect, bar)) = self.bar_mut(id) else {
            return;
        };
        if !bar.dragging {
            return;
        }
        let (travel, track) = match Orientation::of(rect) {
            Orientation::Horizontal => (point.x - bar.down_point.x, rect.width),
            Orientation::Vertical => (point.y - bar.down_point.y, rect.height),
        };
        let position = bar.saved_position + travel as f64 / track as f64 * bar.range;
        if let Err(err) = self.set_scroll_position(ctx, id, position) {
            debug!("scroll bar drag ignored: {err}");
        }
    }

    /// A release off the dragger without a drag pages one track length
    /// toward the pointer. Always ends the drag and releases the grab.
    pub(crate) fn scroll_bar_pointer_up(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let local = point - self.abs_position(id);
        let Ok((rect, bar)) = self.bar_mut(id) else {
            return;
        };
        let page = match (bar.dragging, bar.dragger) {
            (false, Some(d)) => match Orientation::of(rect) {
                Orientation::Horizontal if local.x < d.x => -rect.width,
                Orientation::Horizontal if local.x > d.right() => rect.width,
                Orientation::Vertical if local.y < d.y => -rect.height,
                Orientation::Vertical if local.y > d.bottom() => rect.height,
                _ => 0,
            },
            _ => 0,
        };
        bar.dragging = false;
        if page != 0 {
            if let Err(err) = self.add_scroll_position(ctx, id, page as f64) {
                debug!("scroll bar page ignored: {err}");
            }
        }
        if let Some(window) = self.window_of(id) {
            self.window_ungrab(ctx, window);
        }
        self.set_state(ctx, id, WidgetState::Normal, false);
    }

    /// Refresh the dragger after the bar's rect changed.
    pub(crate) fn refresh_dragger(&mut self, id: WidgetId) {
        if let Ok((rect, bar)) = self.bar_mut(id) {
            bar.update_dragger(rect);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

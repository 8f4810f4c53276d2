//! Scroll views: virtual size, bar management, content-space translation.
//!
//! A scroll view owns two scroll bar children. Its offsets are derived from
//! the bars' positions, clamped to `virtual size - viewport`. Pointer events
//! for content children are shifted by the offsets before generic dispatch.

use log::debug;

use super::{Context, WidgetKind};
use crate::error::{Error, Result};
use crate::event::{Key, KeyEvent};
use crate::geometry::{Point, Rect, Size};
use crate::tree::{WidgetData, WidgetId, WidgetTree};

/// Default thickness of a scroll view's bars.
pub const DEFAULT_BAR_SIZE: i32 = 8;
/// Offset change for one arrow key press.
pub const KEY_SCROLL_STEP: f64 = 10.0;

/// Which bars a scroll view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollType {
    Vertical,
    Horizontal,
    Both,
    /// A bar appears on each axis whose content overflows.
    #[default]
    Auto,
    None,
}

#[derive(Debug)]
pub struct ScrollViewData {
    pub(crate) v_bar: WidgetId,
    pub(crate) h_bar: WidgetId,
    pub(crate) bar_size: i32,
    pub(crate) scroll_type: ScrollType,
    pub(crate) virtual_size: Size,
    pub(crate) work_area: Rect,
}

impl ScrollViewData {
    pub fn v_bar(&self) -> WidgetId {
        self.v_bar
    }

    pub fn h_bar(&self) -> WidgetId {
        self.h_bar
    }

    pub fn bar_size(&self) -> i32 {
        self.bar_size
    }

    pub fn scroll_type(&self) -> ScrollType {
        self.scroll_type
    }

    /// Content extent as of the last relayout.
    pub fn virtual_size(&self) -> Size {
        self.virtual_size
    }

    /// The viewport minus the space taken by visible bars.
    pub fn work_area(&self) -> Rect {
        self.work_area
    }
}

impl WidgetTree {
    /// Create a scroll view with its vertical and horizontal bars.
    pub fn insert_scroll_view(&mut self, parent: WidgetId, rect: Rect, bar_size: i32) -> Result<WidgetId> {
        let mut data = WidgetData::new("scroll-view", rect);
        data.kind = WidgetKind::ScrollView(ScrollViewData {
            v_bar: WidgetId::default(),
            h_bar: WidgetId::default(),
            bar_size,
            scroll_type: ScrollType::Auto,
            virtual_size: rect.size(),
            work_area: Rect::from_size(rect.size()),
        });
        let id = self.insert_child(parent, data)?;

        let v_rect = Rect::new(rect.width - bar_size, 0, bar_size, rect.height);
        let h_rect = Rect::new(0, rect.height - bar_size, rect.width, bar_size);
        let v_bar = self.insert_scroll_bar(id, "vscroll-bar", v_rect)?;
        let h_bar = self.insert_scroll_bar(id, "hscroll-bar", h_rect)?;
        let view = self.view_mut(id)?;
        view.v_bar = v_bar;
        view.h_bar = h_bar;
        Ok(id)
    }

    pub fn scroll_view(&self, id: WidgetId) -> Result<&ScrollViewData> {
        self.try_get(id)?
            .kind
            .as_scroll_view()
            .ok_or(Error::WrongKind { id, expected: "scroll view" })
    }

    fn view_mut(&mut self, id: WidgetId) -> Result<&mut ScrollViewData> {
        match &mut self.try_get_mut(id)?.kind {
            WidgetKind::ScrollView(view) => Ok(view),
            _ => Err(Error::WrongKind { id, expected: "scroll view" }),
        }
    }

    /// The current content offset of a scroll view; zero for anything else.
    pub fn scroll_offset(&self, id: WidgetId) -> Point {
        let Some(data) = self.get(id) else {
            return Point::ZERO;
        };
        let Some(view) = data.kind.as_scroll_view() else {
            return Point::ZERO;
        };
        let axis = |bar: WidgetId, extent: i32, viewport: i32| {
            let position = self.scroll_bar(bar).map(|b| b.position()).unwrap_or(0.0);
            let max = (extent - viewport).max(0) as f64;
            position.min(max).max(0.0).floor() as i32
        };
        Point::new(
            axis(view.h_bar, view.virtual_size.width, data.rect.width),
            axis(view.v_bar, view.virtual_size.height, data.rect.height),
        )
    }

    /// Bounding box of the visible content children plus one bar thickness,
    /// never smaller than the viewport.
    pub fn compute_virtual_size(&self, id: WidgetId) -> Result<Size> {
        let data = self.try_get(id)?;
        let view = self.scroll_view(id)?;
        let extent = self
            .children(id)
            .iter()
            .filter(|&&c| c != view.v_bar && c != view.h_bar)
            .filter_map(|&c| self.get(c))
            .filter(|c| c.visible)
            .fold(Size::ZERO, |acc, c| acc.max(Size::new(c.rect.right(), c.rect.bottom())));
        let padded = Size::new(extent.width + view.bar_size, extent.height + view.bar_size);
        Ok(padded.max(data.rect.size()))
    }

    pub fn set_scroll_type(&mut self, id: WidgetId, scroll_type: ScrollType) -> Result<()> {
        self.view_mut(id)?.scroll_type = scroll_type;
        self.try_get_mut(id)?.needs_relayout = true;
        Ok(())
    }

    pub fn set_scroll_bar_size(&mut self, id: WidgetId, size: i32) -> Result<()> {
        self.view_mut(id)?.bar_size = size;
        self.try_get_mut(id)?.needs_relayout = true;
        Ok(())
    }

    /// Relayout a scroll view if anything changed since the last pass (or
    /// when forced), keeping its scroll positions. Other widgets just clear
    /// their dirty flag.
    pub fn relayout(&mut self, ctx: &mut Context, id: WidgetId, force: bool) -> Result<()> {
        let data = self.try_get(id)?;
        if !(data.needs_relayout || force) {
            return Ok(());
        }
        if data.kind.as_scroll_view().is_some() {
            let (v_bar, h_bar) = {
                let view = self.scroll_view(id)?;
                (view.v_bar, view.h_bar)
            };
            let v = self.scroll_bar(v_bar)?.position();
            let h = self.scroll_bar(h_bar)?.position();
            self.update_scroll_bars(ctx, id)?;
            self.set_scroll_position(ctx, v_bar, v)?;
            self.set_scroll_position(ctx, h_bar, h)?;
        }
        self.try_get_mut(id)?.needs_relayout = false;
        Ok(())
    }

    /// Size, place and show the bars for the current content, and reset
    /// their positions to zero.
    fn update_scroll_bars(&mut self, ctx: &mut Context, id: WidgetId) -> Result<()> {
        let rect = self.try_get(id)?.rect;
        let size = self.compute_virtual_size(id)?;
        let (v_bar, h_bar, t, scroll_type) = {
            let view = self.view_mut(id)?;
            view.virtual_size = size;
            (view.v_bar, view.h_bar, view.bar_size, view.scroll_type)
        };
        debug!("scroll view virtual size {}x{}", size.width, size.height);

        self.resize(v_bar, t, rect.height - t)?;
        self.move_to(v_bar, rect.width - t, 0)?;
        self.resize(h_bar, rect.width - t, t)?;
        self.move_to(h_bar, 0, rect.height - t)?;

        let (show_v, show_h) = match scroll_type {
            ScrollType::Vertical => (true, false),
            ScrollType::Horizontal => (false, true),
            ScrollType::Both => (true, true),
            ScrollType::None => (false, false),
            ScrollType::Auto => (size.height > rect.height, size.width > rect.width),
        };
        match scroll_type {
            ScrollType::Vertical => self.resize(v_bar, t, rect.height)?,
            ScrollType::Horizontal => self.resize(h_bar, rect.width, t)?,
            _ => {}
        }
        self.show(v_bar, show_v)?;
        self.show(h_bar, show_h)?;
        if show_v {
            self.set_scroll_range(v_bar, size.height as f64)?;
            self.set_scroll_position(ctx, v_bar, 0.0)?;
        }
        if show_h {
            self.set_scroll_range(h_bar, size.width as f64)?;
            self.set_scroll_position(ctx, h_bar, 0.0)?;
        }
        self.refresh_dragger(v_bar);
        self.refresh_dragger(h_bar);

        let work_area = Rect::new(
            0,
            0,
            rect.width - if show_v { t } else { 0 },
            rect.height - if show_h { t } else { 0 },
        );
        self.view_mut(id)?.work_area = work_area;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Offsets
    // -----------------------------------------------------------------------

    pub fn x_offset(&self, id: WidgetId) -> i32 {
        self.scroll_offset(id).x
    }

    pub fn y_offset(&self, id: WidgetId) -> i32 {
        self.scroll_offset(id).y
    }

    pub fn set_x_offset(&mut self, ctx: &mut Context, id: WidgetId, offset: f64) -> Result<()> {
        let bar = self.scroll_view(id)?.h_bar;
        self.set_scroll_position(ctx, bar, offset)
    }

    pub fn set_y_offset(&mut self, ctx: &mut Context, id: WidgetId, offset: f64) -> Result<()> {
        let bar = self.scroll_view(id)?.v_bar;
        self.set_scroll_position(ctx, bar, offset)
    }

    pub fn x_scroll_range(&self, id: WidgetId) -> Result<f64> {
        Ok(self.scroll_bar(self.scroll_view(id)?.h_bar)?.range())
    }

    pub fn y_scroll_range(&self, id: WidgetId) -> Result<f64> {
        Ok(self.scroll_bar(self.scroll_view(id)?.v_bar)?.range())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Presses on a visible bar go to the bar unshifted; everything else is
    /// shifted into content space.
    pub(crate) fn scroll_view_pointer_down(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Ok(view) = self.scroll_view(id) else {
            return;
        };
        let local = point - self.abs_position(id);
        let hit_bar = [view.v_bar, view.h_bar].into_iter().find(|&bar| {
            self.get(bar)
                .is_some_and(|b| b.visible && b.rect.contains(local))
        });
        match hit_bar {
            Some(bar) => self.on_pointer_down(ctx, bar, point),
            None => {
                let shifted = point + self.scroll_offset(id);
                self.widget_pointer_down(ctx, id, shifted);
            }
        }
    }

    /// A target that consumes the wheel wins; otherwise the view scrolls
    /// vertically by the delta.
    pub(crate) fn scroll_view_wheel(&mut self, ctx: &mut Context, id: WidgetId, delta: f64) -> bool {
        if self.widget_wheel(ctx, id, delta) {
            return true;
        }
        let y = self.y_offset(id) as f64;
        self.set_y_offset(ctx, id, y + delta).is_ok()
    }

    pub(crate) fn scroll_view_key_down(&mut self, ctx: &mut Context, id: WidgetId, key: KeyEvent) {
        let Some(rect) = self.get(id).map(|d| d.rect) else {
            return;
        };
        let x = self.x_offset(id) as f64;
        let y = self.y_offset(id) as f64;
        let page = rect.height as f64;
        let result = match key.code {
            Key::Left => self.set_x_offset(ctx, id, x - KEY_SCROLL_STEP),
            Key::Right => self.set_x_offset(ctx, id, x + KEY_SCROLL_STEP),
            Key::Up => self.set_y_offset(ctx, id, y - KEY_SCROLL_STEP),
            Key::Down => self.set_y_offset(ctx, id, y + KEY_SCROLL_STEP),
            Key::PageUp => self.set_y_offset(ctx, id, y - page),
            Key::PageDown => self.set_y_offset(ctx, id, y + page),
            Key::Home => self.set_y_offset(ctx, id, 0.0),
            Key::End => match self.y_scroll_range(id) {
                Ok(range) => self.set_y_offset(ctx, id, range - page),
                Err(e) => Err(e),
            },
            _ => {
                self.widget_key_down(ctx, id, key);
                Ok(())
            }
        };
        if let Err(err) = result {
            debug!("scroll key ignored: {err}");
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::render::RedrawScheduler;
    use crate::testing::ManualFrames;
    use crate::widget::WidgetState;

    fn ctx() -> Context {
        Context::new(RedrawScheduler::new(ManualFrames::new()))
    }

    /// A 150x200 scroll view at (10, 20) in a window at the origin, holding
    /// three 100x100 rows stacked down to y = 300.
    fn tall_view() -> (WidgetTree, Context, WidgetId, WidgetId, [WidgetId; 3]) {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 400, 400)));
        let view = tree
            .insert_scroll_view(win, Rect::new(10, 20, 150, 200), DEFAULT_BAR_SIZE)
            .unwrap();
        let rows = [0, 1, 2].map(|i| {
            tree.insert_child(view, WidgetData::new("row", Rect::new(0, i * 100, 100, 100)))
                .unwrap()
        });
        tree.relayout(&mut ctx, view, false).unwrap();
        (tree, ctx, win, view, rows)
    }

    // ── Virtual size and bars ──────────────────────────────────────

    #[test]
    fn virtual_height_includes_bar_thickness() {
        let (tree, _ctx, _win, view, _rows) = tall_view();
        let data = tree.scroll_view(view).unwrap();
        assert_eq!(data.virtual_size(), Size::new(150, 308));

        let v_bar = tree.get(data.v_bar()).unwrap();
        assert!(v_bar.visible);
        assert_eq!(tree.y_scroll_range(view).unwrap(), 308.0);
        assert!(!tree.get(data.h_bar()).unwrap().visible);
        assert_eq!(data.work_area(), Rect::new(0, 0, 142, 200));
    }

    #[test]
    fn hidden_children_do_not_count() {
        let (mut tree, mut ctx, _win, view, rows) = tall_view();
        tree.show(rows[2], false).unwrap();
        tree.relayout(&mut ctx, view, false).unwrap();
        assert_eq!(tree.scroll_view(view).unwrap().virtual_size(), Size::new(150, 208));
    }

    #[test]
    fn small_content_floors_at_viewport() {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 400, 400)));
        let view = tree.insert_scroll_view(win, Rect::new(0, 0, 100, 100), 8).unwrap();
        tree.insert_child(view, WidgetData::new("x", Rect::new(0, 0, 10, 10))).unwrap();
        tree.relayout(&mut ctx, view, false).unwrap();
        let data = tree.scroll_view(view).unwrap();
        assert_eq!(data.virtual_size(), Size::new(100, 100));
        assert!(!tree.get(data.v_bar()).unwrap().visible);
        assert!(!tree.get(data.h_bar()).unwrap().visible);
    }

    #[test]
    fn scroll_type_both_and_none() {
        let (mut tree, mut ctx, _win, view, _rows) = tall_view();
        tree.set_scroll_type(view, ScrollType::Both).unwrap();
        tree.relayout(&mut ctx, view, false).unwrap();
        let (v, h) = {
            let d = tree.scroll_view(view).unwrap();
            (d.v_bar(), d.h_bar())
        };
        assert!(tree.get(v).unwrap().visible && tree.get(h).unwrap().visible);

        tree.set_scroll_type(view, ScrollType::None).unwrap();
        tree.relayout(&mut ctx, view, false).unwrap();
        assert!(!tree.get(v).unwrap().visible && !tree.get(h).unwrap().visible);
    }

    #[test]
    fn relayout_keeps_scroll_position() {
        let (mut tree, mut ctx, _win, view, _rows) = tall_view();
        tree.set_y_offset(&mut ctx, view, 50.0).unwrap();
        tree.relayout(&mut ctx, view, true).unwrap();
        assert_eq!(tree.y_offset(view), 50);
    }

    // ── Offsets ────────────────────────────────────────────────────

    #[test]
    fn offset_is_clamped_to_virtual_minus_viewport() {
        let (mut tree, mut ctx, _win, view, _rows) = tall_view();
        tree.set_y_offset(&mut ctx, view, 10_000.0).unwrap();
        assert_eq!(tree.y_offset(view), 108);
        tree.set_y_offset(&mut ctx, view, -5.0).unwrap();
        assert_eq!(tree.y_offset(view), 0);
    }

    #[test]
    fn position_in_view_subtracts_offset() {
        let (mut tree, mut ctx, _win, view, rows) = tall_view();
        tree.set_y_offset(&mut ctx, view, 40.0).unwrap();
        assert_eq!(tree.abs_position(rows[1]), Point::new(10, 120));
        assert_eq!(tree.position_in_view(rows[1]), Point::new(10, 80));
    }

    // ── Input ──────────────────────────────────────────────────────

    #[test]
    fn pointer_down_is_shifted_into_content() {
        let (mut tree, mut ctx, _win, view, rows) = tall_view();
        tree.set_y_offset(&mut ctx, view, 100.0).unwrap();
        // canvas y 130 is viewport y 110, content y 210: the third row
        tree.scroll_view_pointer_down(&mut ctx, view, Point::new(20, 130));
        assert_eq!(tree.target(view), Some(rows[2]));
        assert_eq!(tree.get(rows[2]).unwrap().state, WidgetState::Active);
    }

    #[test]
    fn pointer_down_on_bar_goes_to_bar() {
        let (mut tree, mut ctx, win, view, rows) = tall_view();
        let v_bar = tree.scroll_view(view).unwrap().v_bar();
        // bar at viewport x 142..150, dragger at the top
        tree.scroll_view_pointer_down(&mut ctx, view, Point::new(155, 30));
        assert!(tree.scroll_bar(v_bar).unwrap().is_dragging());
        assert_eq!(ctx.grab_windows(), &[win]);
        assert_eq!(tree.get(v_bar).unwrap().state, WidgetState::Active);
        assert!(rows.iter().all(|&r| tree.get(r).unwrap().state == WidgetState::Normal));
    }

    #[test]
    fn deep_hit_accounts_for_offset() {
        let (mut tree, mut ctx, win, view, rows) = tall_view();
        tree.set_y_offset(&mut ctx, view, 100.0).unwrap();
        assert_eq!(tree.find_target_widget_ex(win, Point::new(20, 130), true), Some(rows[2]));
    }

    #[test]
    fn wheel_scrolls_vertically() {
        let (mut tree, mut ctx, _win, view, _rows) = tall_view();
        assert!(tree.scroll_view_wheel(&mut ctx, view, 30.0));
        assert_eq!(tree.y_offset(view), 30);
    }

    #[test]
    fn keys_scroll_and_page() {
        let (mut tree, mut ctx, _win, view, _rows) = tall_view();
        let press = |tree: &mut WidgetTree, ctx: &mut Context, key| {
            tree.scroll_view_key_down(ctx, view, KeyEvent::plain(key));
        };
        press(&mut tree, &mut ctx, Key::Down);
        assert_eq!(tree.y_offset(view), 10);
        press(&mut tree, &mut ctx, Key::Up);
        assert_eq!(tree.y_offset(view), 0);
        press(&mut tree, &mut ctx, Key::End);
        assert_eq!(tree.y_offset(view), 108);
        press(&mut tree, &mut ctx, Key::Home);
        assert_eq!(tree.y_offset(view), 0);
        press(&mut tree, &mut ctx, Key::PageDown);
        assert_eq!(tree.y_offset(view), 108);
    }
}

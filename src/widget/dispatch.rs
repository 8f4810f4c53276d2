//! Hit testing and event dispatch through the widget tree.
//!
//! Pointer events carry window coordinates, shifted into content space by
//! every scroll view they pass through. Each widget resolves the child under
//! the point, keeps that child as its target, and forwards the event to it.
//! Keyboard and wheel events follow the target chain without hit testing.

use log::{debug, warn};

use super::{Context, WidgetKind, WidgetState};
use crate::event::KeyEvent;
use crate::geometry::Point;
use crate::tree::{WidgetId, WidgetTree};

/// Pointer gestures delivered once, to the deepest widget under the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    DoubleClick,
    ContextMenu,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindTag {
    Plain,
    Window,
    ScrollBar,
    ScrollView,
}

impl WidgetTree {
    fn kind_of(&self, id: WidgetId) -> Option<KindTag> {
        self.get(id).map(|data| match data.kind {
            WidgetKind::Plain => KindTag::Plain,
            WidgetKind::Window(_) => KindTag::Window,
            WidgetKind::ScrollBar(_) => KindTag::ScrollBar,
            WidgetKind::ScrollView(_) => KindTag::ScrollView,
        })
    }

    // -----------------------------------------------------------------------
    // Hit testing
    // -----------------------------------------------------------------------

    /// The topmost visible child of `id` containing `point`.
    ///
    /// `point` is in window coordinates (content space inside scroll views).
    /// A scroll view's own bars are not candidates; they are tested before
    /// the content is shifted.
    pub fn find_target(&self, id: WidgetId, point: Point) -> Option<WidgetId> {
        let local = point - self.abs_position(id);
        self.children(id).iter().rev().copied().find(|&child| {
            !self.is_scroll_bar_of(id, child)
                && self
                    .get(child)
                    .is_some_and(|c| c.visible && c.rect.contains(local))
        })
    }

    /// The deepest visible widget under `point`, starting at `id`.
    ///
    /// `point` is in the coordinate space of `id`'s parent (canvas space for a
    /// window). Returns `None` if `id` is hidden or does not contain the
    /// point, and `id` itself if no child qualifies or `recursive` is off.
    /// Every child is tested, topmost first.
    pub fn find_target_widget_ex(&self, id: WidgetId, point: Point, recursive: bool) -> Option<WidgetId> {
        let data = self.get(id)?;
        if !data.visible || !data.rect.contains(point) {
            return None;
        }
        if !recursive {
            return Some(id);
        }

        let inner = point - data.rect.origin();
        if let WidgetKind::ScrollView(view) = &data.kind {
            for bar in [view.v_bar, view.h_bar] {
                if let Some(hit) = self.find_target_widget_ex(bar, inner, true) {
                    return Some(hit);
                }
            }
        }

        let content = inner + self.scroll_offset(id);
        self.children(id)
            .iter()
            .rev()
            .filter(|&&child| !self.is_scroll_bar_of(id, child))
            .find_map(|&child| self.find_target_widget_ex(child, content, true))
            .or(Some(id))
    }

    fn is_scroll_bar_of(&self, view: WidgetId, child: WidgetId) -> bool {
        self.get(view)
            .and_then(|d| d.kind.as_scroll_view())
            .is_some_and(|v| v.v_bar == child || v.h_bar == child)
    }

    // -----------------------------------------------------------------------
    // Routing by kind
    // -----------------------------------------------------------------------

    pub(crate) fn on_pointer_down(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_pointer_down(ctx, id, point),
            Some(KindTag::ScrollBar) => self.scroll_bar_pointer_down(ctx, id, point),
            Some(KindTag::ScrollView) => self.scroll_view_pointer_down(ctx, id, point),
            Some(KindTag::Plain) => self.widget_pointer_down(ctx, id, point),
            None => {}
        }
    }

    pub(crate) fn on_pointer_move(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_pointer_move(ctx, id, point),
            Some(KindTag::ScrollBar) => self.scroll_bar_pointer_move(ctx, id, point),
            Some(KindTag::ScrollView) => {
                let shifted = point + self.scroll_offset(id);
                self.widget_pointer_move(ctx, id, shifted);
            }
            Some(KindTag::Plain) => self.widget_pointer_move(ctx, id, point),
            None => {}
        }
    }

    pub(crate) fn on_pointer_up(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_pointer_up(ctx, id, point),
            Some(KindTag::ScrollBar) => self.scroll_bar_pointer_up(ctx, id, point),
            Some(KindTag::ScrollView) => {
                let shifted = point + self.scroll_offset(id);
                self.widget_pointer_up(ctx, id, shifted);
            }
            Some(KindTag::Plain) => self.widget_pointer_up(ctx, id, point),
            None => {}
        }
    }

    pub(crate) fn on_key_down(&mut self, ctx: &mut Context, id: WidgetId, key: KeyEvent) {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_key(ctx, id, key, true),
            Some(KindTag::ScrollView) => self.scroll_view_key_down(ctx, id, key),
            Some(_) => self.widget_key_down(ctx, id, key),
            None => {}
        }
    }

    pub(crate) fn on_key_up(&mut self, ctx: &mut Context, id: WidgetId, key: KeyEvent) {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_key(ctx, id, key, false),
            Some(_) => self.widget_key_up(ctx, id, key),
            None => {}
        }
    }

    /// Returns whether something consumed the wheel delta.
    pub(crate) fn on_wheel(&mut self, ctx: &mut Context, id: WidgetId, delta: f64) -> bool {
        match self.kind_of(id) {
            Some(KindTag::Window) => self.window_wheel(ctx, id, delta),
            Some(KindTag::ScrollView) => self.scroll_view_wheel(ctx, id, delta),
            Some(_) => self.widget_wheel(ctx, id, delta),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Generic pointer handling
    // -----------------------------------------------------------------------

    pub(crate) fn widget_pointer_down(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Some(data) = self.get(id) else {
            return;
        };
        if !data.enabled {
            return;
        }
        let cursor = data.cursor;

        let target = self.find_target(id, point);
        if let Some(old) = self.target(id).filter(|&old| Some(old) != target) {
            self.set_state(ctx, old, WidgetState::Normal, false);
        }
        self.set_target(id, target);
        match target {
            Some(t) => {
                self.set_state(ctx, t, WidgetState::Active, false);
                self.on_pointer_down(ctx, t, point);
            }
            None => ctx.request_cursor(cursor),
        }

        if let Some(handler) = self.handlers_mut(id).and_then(|h| h.pointer_down.as_mut()) {
            handler(id, point);
        }
        ctx.post_redraw();
    }

    /// While the manager reports a held button, the existing target keeps
    /// receiving moves (and stays ACTIVE) instead of re-hit-testing.
    pub(crate) fn widget_pointer_move(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Some(data) = self.get(id) else {
            return;
        };
        if !data.enabled {
            return;
        }
        let cursor = data.cursor;

        let dragging = ctx.is_pointer_down();
        let current = self.target(id);
        let target = if dragging {
            current
        } else {
            self.find_target(id, point)
        };
        if let Some(old) = current.filter(|&old| Some(old) != target) {
            self.set_state(ctx, old, WidgetState::Normal, true);
        }
        self.set_target(id, target);
        match target {
            Some(t) => {
                let state = if dragging { WidgetState::Active } else { WidgetState::Over };
                self.set_state(ctx, t, state, false);
                self.on_pointer_move(ctx, t, point);
            }
            None => ctx.request_cursor(cursor),
        }

        if let Some(handler) = self.handlers_mut(id).and_then(|h| h.pointer_move.as_mut()) {
            handler(id, point);
        }
        ctx.post_redraw();
    }

    /// A previous target that is no longer under the pointer still gets the
    /// up event, then drops to NORMAL. The click callback fires when the
    /// enclosing window saw a tap.
    pub(crate) fn widget_pointer_up(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Some(data) = self.get(id) else {
            return;
        };
        if !data.enabled {
            return;
        }
        let cursor = data.cursor;

        let target = self.find_target(id, point);
        if let Some(old) = self.target(id).filter(|&old| Some(old) != target) {
            self.on_pointer_up(ctx, old, point);
            self.set_state(ctx, old, WidgetState::Normal, true);
        }
        self.set_target(id, target);
        match target {
            Some(t) => {
                self.on_pointer_up(ctx, t, point);
                self.set_state(ctx, t, WidgetState::Over, false);
            }
            None => ctx.request_cursor(cursor),
        }

        if let Some(handler) = self.handlers_mut(id).and_then(|h| h.pointer_up.as_mut()) {
            handler(id, point);
        }
        if self.window_of(id).is_some_and(|w| self.window_is_clicked(w)) {
            self.fire_click(ctx, id, point);
        }
        ctx.post_redraw();
    }

    /// Run the click callback, logging a failure instead of propagating it.
    pub(crate) fn fire_click(&mut self, ctx: &mut Context, id: WidgetId, point: Point) {
        let Some(data) = self.get_mut(id) else {
            return;
        };
        if let Some(click) = data.handlers.click.as_mut() {
            if let Err(err) = click(id, point) {
                warn!("click handler on {} failed: {err}", data.type_name);
            }
            ctx.post_redraw();
        }
    }

    /// Deliver a one-shot gesture to `id`'s handler. Disabled widgets ignore
    /// it; interaction state is left alone.
    pub fn fire_gesture(&mut self, id: WidgetId, gesture: Gesture, point: Point) {
        let Some(data) = self.get_mut(id) else {
            return;
        };
        if !data.enabled || data.state == WidgetState::Disable {
            debug!("{gesture:?} ignored by disabled {}", data.type_name);
            return;
        }
        let handler = match gesture {
            Gesture::DoubleClick => data.handlers.double_click.as_mut(),
            Gesture::ContextMenu => data.handlers.context_menu.as_mut(),
            Gesture::LongPress => data.handlers.long_press.as_mut(),
        };
        if let Some(handler) = handler {
            handler(id, point);
        }
    }

    // -----------------------------------------------------------------------
    // Generic keyboard and wheel handling
    // -----------------------------------------------------------------------

    /// The target hears the key first, then the widget itself.
    pub(crate) fn widget_key_down(&mut self, ctx: &mut Context, id: WidgetId, key: KeyEvent) {
        if let Some(target) = self.target(id) {
            self.on_key_down(ctx, target, key);
        }
        if let Some(handler) = self.handlers_mut(id).and_then(|h| h.key_down.as_mut()) {
            handler(id, key);
        }
    }

    pub(crate) fn widget_key_up(&mut self, ctx: &mut Context, id: WidgetId, key: KeyEvent) {
        if let Some(target) = self.target(id) {
            self.on_key_up(ctx, target, key);
        }
        if let Some(handler) = self.handlers_mut(id).and_then(|h| h.key_up.as_mut()) {
            handler(id, key);
        }
    }

    /// With a target, the wheel belongs to the target chain; otherwise the
    /// widget's own handler runs.
    pub(crate) fn widget_wheel(&mut self, ctx: &mut Context, id: WidgetId, delta: f64) -> bool {
        if let Some(target) = self.target(id) {
            return self.on_wheel(ctx, target, delta);
        }
        match self.handlers_mut(id).and_then(|h| h.wheel.as_mut()) {
            Some(handler) => {
                handler(id, delta);
                true
            }
            None => false,
        }
    }

    fn handlers_mut(&mut self, id: WidgetId) -> Option<&mut crate::tree::Handlers> {
        self.get_mut(id).map(|d| &mut d.handlers)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::Key;
    use crate::geometry::Rect;
    use crate::render::RedrawScheduler;
    use crate::testing::ManualFrames;
    use crate::tree::WidgetData;

    fn ctx() -> Context {
        Context::new(RedrawScheduler::new(ManualFrames::new()))
    }

    /// Window at (100, 100) with three overlapping children:
    /// ```text
    ///   low   (0, 0, 50, 50)
    ///   mid   (20, 20, 50, 50)   hidden when `hide_mid`
    ///   top   (40, 40, 50, 50)
    /// ```
    fn stacked(hide_mid: bool) -> (WidgetTree, WidgetId, [WidgetId; 3]) {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(100, 100, 200, 200)));
        let low = tree.insert_child(win, WidgetData::new("low", Rect::new(0, 0, 50, 50))).unwrap();
        let mid = tree
            .insert_child(win, WidgetData::new("mid", Rect::new(20, 20, 50, 50)).visible(!hide_mid))
            .unwrap();
        let top = tree.insert_child(win, WidgetData::new("top", Rect::new(40, 40, 50, 50))).unwrap();
        (tree, win, [low, mid, top])
    }

    // ── find_target ────────────────────────────────────────────────

    #[test]
    fn find_target_prefers_topmost() {
        let (tree, win, [low, mid, top]) = stacked(false);
        assert_eq!(tree.find_target(win, Point::new(145, 145)), Some(top));
        assert_eq!(tree.find_target(win, Point::new(125, 125)), Some(mid));
        assert_eq!(tree.find_target(win, Point::new(105, 105)), Some(low));
        assert_eq!(tree.find_target(win, Point::new(295, 295)), None);
    }

    #[test]
    fn find_target_skips_hidden_children() {
        let (tree, win, [low, _mid, _top]) = stacked(true);
        assert_eq!(tree.find_target(win, Point::new(125, 125)), Some(low));
    }

    #[test]
    fn find_target_matches_largest_index_rule() {
        let (tree, win, kids) = stacked(false);
        for x in (90..200).step_by(7) {
            for y in (90..200).step_by(11) {
                let p = Point::new(x, y);
                let local = p - Point::new(100, 100);
                let expected = kids
                    .iter()
                    .rev()
                    .copied()
                    .find(|&k| tree.get(k).unwrap().rect.contains(local));
                assert_eq!(tree.find_target(win, p), expected, "at {p:?}");
            }
        }
    }

    // ── find_target_widget_ex ──────────────────────────────────────

    #[test]
    fn deep_hit_reaches_first_child() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)));
        let first = tree.insert_child(win, WidgetData::new("a", Rect::new(0, 0, 10, 10))).unwrap();
        let _second = tree.insert_child(win, WidgetData::new("b", Rect::new(50, 50, 10, 10))).unwrap();
        assert_eq!(tree.find_target_widget_ex(win, Point::new(5, 5), true), Some(first));
    }

    #[test]
    fn deep_hit_descends_nested() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(10, 10, 100, 100)));
        let panel = tree.insert_child(win, WidgetData::new("panel", Rect::new(10, 10, 50, 50))).unwrap();
        let leaf = tree.insert_child(panel, WidgetData::new("leaf", Rect::new(5, 5, 10, 10))).unwrap();
        assert_eq!(tree.find_target_widget_ex(win, Point::new(27, 27), true), Some(leaf));
        assert_eq!(tree.find_target_widget_ex(win, Point::new(50, 50), true), Some(panel));
        assert_eq!(tree.find_target_widget_ex(win, Point::new(12, 12), true), Some(win));
        assert_eq!(tree.find_target_widget_ex(win, Point::new(12, 12), false), Some(win));
        assert_eq!(tree.find_target_widget_ex(win, Point::new(0, 0), true), None);
    }

    #[test]
    fn deep_hit_ignores_hidden_widget() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)).visible(false));
        assert_eq!(tree.find_target_widget_ex(win, Point::new(5, 5), true), None);
    }

    // ── Pointer dispatch ───────────────────────────────────────────

    #[test]
    fn pointer_down_activates_target_and_resets_previous() {
        let (mut tree, win, [low, _mid, top]) = stacked(false);
        let mut ctx = ctx();
        tree.widget_pointer_down(&mut ctx, win, Point::new(145, 145));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Active);
        assert_eq!(tree.target(win), Some(top));

        tree.widget_pointer_down(&mut ctx, win, Point::new(105, 105));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Normal);
        assert_eq!(tree.get(low).unwrap().state, WidgetState::Active);
    }

    #[test]
    fn hover_moves_between_siblings() {
        let (mut tree, win, [low, _mid, top]) = stacked(false);
        let mut ctx = ctx();
        tree.widget_pointer_move(&mut ctx, win, Point::new(145, 145));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Over);
        assert_eq!(ctx.tips(), Some(top));

        tree.widget_pointer_move(&mut ctx, win, Point::new(105, 105));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Normal);
        assert_eq!(tree.get(low).unwrap().state, WidgetState::Over);
    }

    #[test]
    fn drag_keeps_captured_target() {
        let (mut tree, win, [low, _mid, top]) = stacked(false);
        let mut ctx = ctx();
        tree.widget_pointer_down(&mut ctx, win, Point::new(145, 145));
        ctx.pointer_down = true;
        tree.widget_pointer_move(&mut ctx, win, Point::new(105, 105));
        assert_eq!(tree.target(win), Some(top));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Active);
        assert_eq!(tree.get(low).unwrap().state, WidgetState::Normal);
    }

    #[test]
    fn drag_from_empty_space_does_not_capture() {
        let (mut tree, win, [low, _mid, top]) = stacked(false);
        let mut ctx = ctx();
        tree.widget_pointer_down(&mut ctx, win, Point::new(250, 250));
        assert_eq!(tree.target(win), None);
        ctx.pointer_down = true;
        tree.widget_pointer_move(&mut ctx, win, Point::new(145, 145));
        assert_eq!(tree.target(win), None);
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Normal);
        assert_eq!(tree.get(low).unwrap().state, WidgetState::Normal);
    }

    #[test]
    fn pointer_up_flushes_old_target() {
        let ups = Rc::new(RefCell::new(Vec::new()));
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 200, 200)));
        let add = |tree: &mut WidgetTree, name: &'static str, rect| {
            let sink = ups.clone();
            tree.insert_child(
                win,
                WidgetData::new(name, rect).on_pointer_up(move |_, _| sink.borrow_mut().push(name)),
            )
            .unwrap()
        };
        let a = add(&mut tree, "a", Rect::new(0, 0, 50, 50));
        let b = add(&mut tree, "b", Rect::new(100, 100, 50, 50));
        let mut ctx = ctx();

        tree.widget_pointer_down(&mut ctx, win, Point::new(10, 10));
        tree.widget_pointer_up(&mut ctx, win, Point::new(110, 110));
        assert_eq!(*ups.borrow(), vec!["a", "b"]);
        assert_eq!(tree.get(a).unwrap().state, WidgetState::Normal);
        assert_eq!(tree.get(b).unwrap().state, WidgetState::Over);
    }

    #[test]
    fn disabled_widget_ignores_pointer() {
        let (mut tree, win, [_low, _mid, top]) = stacked(false);
        tree.set_enabled(win, false).unwrap();
        let mut ctx = ctx();
        tree.widget_pointer_down(&mut ctx, win, Point::new(145, 145));
        assert_eq!(tree.get(top).unwrap().state, WidgetState::Normal);
        assert_eq!(tree.target(win), None);
    }

    // ── Gestures ───────────────────────────────────────────────────

    #[test]
    fn gesture_runs_matching_handler_only() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut tree = WidgetTree::new();
        let (d, c) = (hits.clone(), hits.clone());
        let w = tree.insert_root(
            WidgetData::new("x", Rect::new(0, 0, 10, 10))
                .on_double_click(move |_, _| d.borrow_mut().push("double"))
                .on_context_menu(move |_, _| c.borrow_mut().push("context")),
        );
        tree.fire_gesture(w, Gesture::ContextMenu, Point::ZERO);
        tree.fire_gesture(w, Gesture::LongPress, Point::ZERO);
        assert_eq!(*hits.borrow(), vec!["context"]);
        assert_eq!(tree.get(w).unwrap().state, WidgetState::Normal);
    }

    #[test]
    fn gesture_ignored_when_disabled() {
        let hits = Rc::new(RefCell::new(0));
        let mut tree = WidgetTree::new();
        let sink = hits.clone();
        let w = tree.insert_root(
            WidgetData::new("x", Rect::EMPTY)
                .enabled(false)
                .on_double_click(move |_, _| *sink.borrow_mut() += 1),
        );
        tree.fire_gesture(w, Gesture::DoubleClick, Point::ZERO);
        assert_eq!(*hits.borrow(), 0);
    }

    // ── Keyboard and wheel ─────────────────────────────────────────

    #[test]
    fn key_reaches_target_before_self() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut tree = WidgetTree::new();
        let (p, c) = (order.clone(), order.clone());
        let parent = tree.insert_root(
            WidgetData::new("parent", Rect::new(0, 0, 100, 100))
                .on_key_down(move |_, _| p.borrow_mut().push("parent")),
        );
        let child = tree
            .insert_child(
                parent,
                WidgetData::new("child", Rect::new(0, 0, 10, 10))
                    .on_key_down(move |_, _| c.borrow_mut().push("child")),
            )
            .unwrap();
        tree.set_target(parent, Some(child));
        let mut ctx = ctx();
        tree.on_key_down(&mut ctx, parent, KeyEvent::plain(Key::Enter));
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn wheel_goes_to_target_or_own_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tree = WidgetTree::new();
        let sink = seen.clone();
        let parent = tree.insert_root(
            WidgetData::new("parent", Rect::new(0, 0, 100, 100))
                .on_wheel(move |_, d| sink.borrow_mut().push(d)),
        );
        let child = tree.insert_child(parent, WidgetData::new("child", Rect::new(0, 0, 10, 10))).unwrap();
        let mut ctx = ctx();

        assert!(tree.on_wheel(&mut ctx, parent, 3.0));
        assert_eq!(*seen.borrow(), vec![3.0]);

        tree.set_target(parent, Some(child));
        assert!(!tree.on_wheel(&mut ctx, parent, 4.0));
        assert_eq!(*seen.borrow(), vec![3.0]);
    }
}

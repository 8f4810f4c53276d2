//! The window manager: window list, input routing, frame painting.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::event::{EventConsumer, KeyEvent};
use crate::geometry::{Point, Rect, Size};
use crate::render::{RedrawScheduler, Surface};
use crate::theme::ThemeProvider;
use crate::tree::{WidgetData, WidgetId, WidgetTree};
use crate::widget::{Context, Gesture, WidgetState};

/// Press-to-release travel (per axis) below which the manager considers the
/// pointer stationary. Window click detection uses the tighter
/// [`CLICK_THRESHOLD`](super::CLICK_THRESHOLD).
pub const MANAGER_CLICK_THRESHOLD: i32 = 10;

/// Default delay between creating a window and it becoming hit-testable.
pub const DEFAULT_REGISTRATION_DELAY: Duration = Duration::from_millis(10);

/// Owns the widget tree and every window in it.
///
/// Windows are painted in list order and hit-tested in the same order; a
/// window holding a grab wins every pointer hit test while visible.
pub struct WindowManager {
    tree: WidgetTree,
    ctx: Context,
    windows: Vec<WidgetId>,
    pending: Vec<(Instant, WidgetId)>,
    target: Option<WidgetId>,
    pointer_down_point: Point,
    last_pointer_point: Point,
    input_offset: Point,
    input_scale: (f64, f64),
    registration_delay: Duration,
    scroll_bar_size: i32,
    size: Size,
}

impl WindowManager {
    pub fn new(scheduler: RedrawScheduler, size: Size) -> Self {
        Self {
            tree: WidgetTree::new(),
            ctx: Context::new(scheduler),
            windows: Vec::new(),
            pending: Vec::new(),
            target: None,
            pointer_down_point: Point::ZERO,
            last_pointer_point: Point::ZERO,
            input_offset: Point::ZERO,
            input_scale: (1.0, 1.0),
            registration_delay: DEFAULT_REGISTRATION_DELAY,
            scroll_bar_size: crate::widget::scroll_view::DEFAULT_BAR_SIZE,
            size,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// The tree and the dispatch context together, for operations that need
    /// both (scrolling, state changes).
    pub fn parts_mut(&mut self) -> (&mut WidgetTree, &mut Context) {
        (&mut self.tree, &mut self.ctx)
    }

    /// Registered windows in paint order.
    pub fn windows(&self) -> &[WidgetId] {
        &self.windows
    }

    /// The window that received the most recent event.
    pub fn target(&self) -> Option<WidgetId> {
        self.target.filter(|&t| self.tree.contains(t))
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scroll_bar_size(&self) -> i32 {
        self.scroll_bar_size
    }

    pub fn set_scroll_bar_size(&mut self, size: i32) {
        self.scroll_bar_size = size;
    }

    /// Insert a scroll view whose bars use the manager's default thickness.
    pub fn insert_scroll_view(&mut self, parent: WidgetId, rect: Rect) -> Result<WidgetId> {
        self.tree.insert_scroll_view(parent, rect, self.scroll_bar_size)
    }

    pub fn set_registration_delay(&mut self, delay: Duration) {
        self.registration_delay = delay;
    }

    pub fn set_input_offset(&mut self, x: i32, y: i32) {
        self.input_offset = Point::new(x, y);
    }

    pub fn set_input_scale(&mut self, x: f64, y: f64) {
        self.input_scale = (x, y);
    }

    pub fn input_scale(&self) -> (f64, f64) {
        self.input_scale
    }

    pub fn draw_count(&self) -> u64 {
        self.ctx.scheduler().draw_count()
    }

    pub fn is_pointer_down(&self) -> bool {
        self.ctx.is_pointer_down()
    }

    pub fn last_pointer_point(&self) -> Point {
        self.last_pointer_point
    }

    /// Whether the pointer stayed within [`MANAGER_CLICK_THRESHOLD`] since it
    /// went down.
    pub fn is_clicked(&self) -> bool {
        self.last_pointer_point
            .within(self.pointer_down_point, MANAGER_CLICK_THRESHOLD)
    }

    // -----------------------------------------------------------------------
    // Window lifecycle
    // -----------------------------------------------------------------------

    /// Create a window. It joins the window list once
    /// [`register_due_windows`](Self::register_due_windows) runs after the
    /// registration delay.
    pub fn create_window(&mut self, rect: Rect, now: Instant) -> WidgetId {
        let id = self.tree.insert_root(WidgetData::window(rect));
        self.pending.push((now + self.registration_delay, id));
        debug!("window created, registering in {:?}", self.registration_delay);
        id
    }

    /// Register every pending window whose delay has elapsed. Returns how
    /// many were added.
    pub fn register_due_windows(&mut self, now: Instant) -> usize {
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|&(deadline, _)| deadline <= now);
        self.pending = waiting;
        let count = due.len();
        for (_, id) in due {
            if let Err(err) = self.add_window(id) {
                debug!("pending window skipped: {err}");
            }
        }
        count
    }

    /// Whether any window is waiting for registration.
    pub fn has_pending_windows(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Append `window` to the list immediately and make it the target.
    /// Adding a window twice is a no-op.
    pub fn add_window(&mut self, window: WidgetId) -> Result<()> {
        self.tree.window(window)?;
        if self.tree.parent(window).is_some() {
            return Err(Error::NotARoot(window));
        }
        if self.windows.contains(&window) {
            return Ok(());
        }
        self.dispatch_pointer_move_out();
        self.target = Some(window);
        self.windows.push(window);
        self.ctx.post_redraw();
        Ok(())
    }

    /// Drop `window` from the list, the grab list and the target slot. The
    /// widgets stay in the tree.
    pub fn remove_window(&mut self, window: WidgetId) {
        self.ctx.ungrab_window(window);
        if self.target == Some(window) {
            self.target = None;
        }
        self.windows.retain(|&w| w != window);
        self.pending.retain(|&(_, w)| w != window);
        self.ctx.post_redraw();
    }

    /// Remove `window` and destroy its whole subtree.
    pub fn close_window(&mut self, window: WidgetId) -> Vec<WidgetId> {
        self.remove_window(window);
        self.destroy_widget(window)
    }

    /// Destroy `id` and its subtree, forgetting every reference the manager
    /// holds into it.
    pub fn destroy_widget(&mut self, id: WidgetId) -> Vec<WidgetId> {
        let removed = self.tree.destroy(id);
        if removed.is_empty() {
            return removed;
        }
        self.ctx.forget(&removed);
        let orphaned: Vec<_> = self
            .ctx
            .grab_windows()
            .iter()
            .copied()
            .filter(|&w| self.tree.window_grab_widget(w).is_none())
            .collect();
        for window in orphaned {
            debug!("grab widget destroyed, releasing window grab");
            self.ctx.ungrab_window(window);
        }
        self.windows.retain(|w| !removed.contains(w));
        self.pending.retain(|(_, w)| !removed.contains(w));
        if self.target.is_some_and(|t| removed.contains(&t)) {
            self.target = None;
        }
        self.ctx.post_redraw();
        removed
    }

    // -----------------------------------------------------------------------
    // Targeting
    // -----------------------------------------------------------------------

    /// The first visible grabbing window, else the first visible window
    /// containing `point`.
    pub fn find_target_window(&self, point: Point) -> Option<WidgetId> {
        let visible = |&w: &WidgetId| self.tree.get(w).is_some_and(|d| d.visible);
        if let Some(grab) = self.ctx.grab_windows().iter().copied().find(visible) {
            return Some(grab);
        }
        self.windows.iter().copied().filter(visible).find(|&w| {
            self.tree
                .get(w)
                .is_some_and(|d| d.rect.contains(point))
        })
    }

    /// Make the first visible window the target.
    pub fn set_top_window_as_target(&mut self) {
        self.target = self
            .windows
            .iter()
            .copied()
            .find(|&w| self.tree.get(w).is_some_and(|d| d.visible));
    }

    /// Send a move outside every window so hover state unwinds, then clear
    /// the target.
    pub fn dispatch_pointer_move_out(&mut self) {
        self.pointer_move(Point::new(-1, -1));
        self.target = None;
    }

    /// Canvas coordinates for a client point: subtract the offset, then
    /// scale, rounding up.
    pub fn translate_point(&self, point: Point) -> Point {
        let (sx, sy) = self.input_scale;
        let local = point - self.input_offset;
        Point::new(
            (f64::from(local.x) * sx).ceil() as i32,
            (f64::from(local.y) * sy).ceil() as i32,
        )
    }

    fn live_target(&mut self) -> Option<WidgetId> {
        if self.target().is_none() {
            self.set_top_window_as_target();
        }
        self.target()
    }

    // -----------------------------------------------------------------------
    // Canvas-space dispatch
    // -----------------------------------------------------------------------

    fn pointer_down(&mut self, point: Point) {
        self.target = self.find_target_window(point);
        let selected: Vec<_> = self
            .windows
            .iter()
            .copied()
            .filter(|&w| Some(w) != self.target)
            .filter(|&w| self.tree.get(w).is_some_and(|d| d.state == WidgetState::Selected))
            .collect();
        for window in selected {
            self.tree.set_state(&mut self.ctx, window, WidgetState::Normal, false);
        }

        self.ctx.pointer_down = true;
        self.pointer_down_point = point;
        self.last_pointer_point = point;
        match self.target {
            Some(window) => self.tree.on_pointer_down(&mut self.ctx, window, point),
            None => debug!("pointer down at {point:?} hit no window"),
        }
    }

    fn pointer_move(&mut self, point: Point) {
        let next = self.find_target_window(point);
        self.last_pointer_point = point;
        if let Some(previous) = self.target().filter(|&t| Some(t) != next) {
            self.tree.on_pointer_move(&mut self.ctx, previous, point);
        }
        self.target = next;
        if let Some(window) = next {
            self.tree.on_pointer_move(&mut self.ctx, window, point);
        }
    }

    fn pointer_up(&mut self, point: Point) {
        self.last_pointer_point = point;
        self.target = self.find_target_window(point);
        match self.target {
            Some(window) => self.tree.on_pointer_up(&mut self.ctx, window, point),
            None => debug!("pointer up at {point:?} hit no window"),
        }
        self.ctx.pointer_down = false;
    }

    fn gesture(&mut self, gesture: Gesture, point: Point) {
        self.target = self.find_target_window(point);
        match self.target {
            Some(window) => self.tree.window_gesture(window, gesture, point),
            None => debug!("{gesture:?} at {point:?} hit no window"),
        }
    }

    // -----------------------------------------------------------------------
    // Painting
    // -----------------------------------------------------------------------

    pub fn resize(&mut self, width: i32, height: i32) {
        self.size = Size::new(width, height);
        self.ctx.post_redraw();
    }

    pub fn paint_enabled(&self) -> bool {
        self.ctx.scheduler().paint_enabled()
    }

    pub fn set_paint_enabled(&mut self, enabled: bool) {
        self.ctx.scheduler_mut().set_paint_enabled(enabled);
    }

    pub fn set_max_fps_mode(&mut self, on: bool) {
        self.ctx.scheduler_mut().set_max_fps(on);
    }

    /// Paint one frame: every window in list order, then the tips widget.
    pub fn on_frame(&mut self, surface: &mut dyn Surface, theme: &dyn ThemeProvider) {
        self.ctx.scheduler_mut().begin_frame();
        trace!("frame {}", self.draw_count());
        if let Some(cursor) = self.ctx.take_cursor() {
            surface.set_cursor(cursor);
        }

        surface.save();
        for window in self.windows.clone() {
            self.tree.paint(&mut self.ctx, surface, theme, window);
        }
        if let Some(tips) = self.ctx.tips() {
            self.tree.paint_tips(surface, theme, tips);
        }
        surface.restore();

        self.ctx.scheduler_mut().end_frame();
    }
}

impl EventConsumer for WindowManager {
    fn on_pointer_down(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.pointer_down(point);
    }

    fn on_pointer_move(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.pointer_move(point);
    }

    fn on_pointer_up(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.pointer_up(point);
    }

    fn on_double_click(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.gesture(Gesture::DoubleClick, point);
    }

    fn on_context_menu(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.gesture(Gesture::ContextMenu, point);
    }

    fn on_long_press(&mut self, point: Point) {
        let point = self.translate_point(point);
        self.gesture(Gesture::LongPress, point);
    }

    fn on_wheel(&mut self, delta: f64) {
        self.ctx.post_redraw();
        if let Some(window) = self.live_target() {
            self.tree.on_wheel(&mut self.ctx, window, delta);
        }
    }

    fn on_key_down(&mut self, key: KeyEvent) {
        if let Some(window) = self.live_target() {
            self.tree.on_key_down(&mut self.ctx, window, key);
        }
    }

    fn on_key_up(&mut self, key: KeyEvent) {
        if let Some(window) = self.target() {
            self.tree.on_key_up(&mut self.ctx, window, key);
        }
    }

    /// The manager's own threshold, used to cancel a pending long press.
    fn pointer_travelled(&self, from: Point, to: Point) -> bool {
        let (from, to) = (self.translate_point(from), self.translate_point(to));
        !to.within(from, MANAGER_CLICK_THRESHOLD)
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
    use crate::testing::ManualFrames;

    fn manager() -> (WindowManager, ManualFrames) {
        let frames = ManualFrames::new();
        let wm = WindowManager::new(RedrawScheduler::new(frames.clone()), Size::new(800, 600));
        (wm, frames)
    }

    fn registered(wm: &mut WindowManager, rect: Rect) -> WidgetId {
        let now = Instant::now();
        let id = wm.create_window(rect, now);
        wm.register_due_windows(now + DEFAULT_REGISTRATION_DELAY);
        id
    }

    // ── Registration ───────────────────────────────────────────────

    #[test]
    fn window_registration_is_deferred() {
        let (mut wm, _frames) = manager();
        let now = Instant::now();
        let win = wm.create_window(Rect::new(0, 0, 100, 100), now);
        assert!(wm.windows().is_empty());
        assert_eq!(wm.find_target_window(Point::new(10, 10)), None);

        assert_eq!(wm.register_due_windows(now + Duration::from_millis(5)), 0);
        assert_eq!(wm.register_due_windows(now + Duration::from_millis(10)), 1);
        assert_eq!(wm.windows(), &[win]);
        assert_eq!(wm.target(), Some(win));
    }

    #[test]
    fn add_window_rejects_children_and_plain_widgets() {
        let (mut wm, _frames) = manager();
        let win = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let child = wm
            .tree_mut()
            .insert_child(win, WidgetData::new("child", Rect::new(0, 0, 10, 10)))
            .unwrap();
        let plain = wm.tree_mut().insert_root(WidgetData::new("plain", Rect::new(0, 0, 10, 10)));
        assert!(matches!(wm.add_window(child), Err(Error::WrongKind { .. })));
        assert!(matches!(wm.add_window(plain), Err(Error::WrongKind { .. })));

        let nested = wm
            .tree_mut()
            .insert_child(win, WidgetData::window(Rect::new(0, 0, 10, 10)))
            .unwrap();
        assert!(matches!(wm.add_window(nested), Err(Error::NotARoot(id)) if id == nested));
        assert!(wm.add_window(win).is_ok());
        assert_eq!(wm.windows(), &[win]);
    }

    #[test]
    fn remove_window_clears_target_and_grab() {
        let (mut wm, _frames) = manager();
        let win = registered(&mut wm, Rect::new(0, 0, 100, 100));
        wm.context_mut().grab_window(win);
        wm.remove_window(win);
        assert!(wm.windows().is_empty());
        assert_eq!(wm.target(), None);
        assert!(wm.context().grab_windows().is_empty());
        assert!(wm.tree().contains(win));
    }

    #[test]
    fn close_window_destroys_subtree() {
        let (mut wm, _frames) = manager();
        let win = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let child = wm
            .tree_mut()
            .insert_child(win, WidgetData::new("child", Rect::new(0, 0, 10, 10)))
            .unwrap();
        let removed = wm.close_window(win);
        assert_eq!(removed, vec![child, win]);
        assert!(wm.tree().is_empty());
    }

    #[test]
    fn destroying_grab_widget_releases_window_grab() {
        let (mut wm, _frames) = manager();
        let a = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let b = registered(&mut wm, Rect::new(200, 0, 100, 100));
        let child = wm
            .tree_mut()
            .insert_child(a, WidgetData::new("slider", Rect::new(0, 0, 10, 10)))
            .unwrap();
        let (tree, ctx) = wm.parts_mut();
        tree.window_grab(ctx, a, child);
        assert_eq!(wm.find_target_window(Point::new(210, 10)), Some(a));

        wm.destroy_widget(child);
        assert!(wm.context().grab_windows().is_empty());
        assert_eq!(wm.find_target_window(Point::new(210, 10)), Some(b));
    }

    // ── Hit testing ────────────────────────────────────────────────

    #[test]
    fn first_containing_visible_window_wins() {
        let (mut wm, _frames) = manager();
        let a = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let b = registered(&mut wm, Rect::new(50, 50, 100, 100));
        assert_eq!(wm.find_target_window(Point::new(60, 60)), Some(a));
        assert_eq!(wm.find_target_window(Point::new(120, 120)), Some(b));
        assert_eq!(wm.find_target_window(Point::new(500, 500)), None);

        wm.tree_mut().show(a, false).unwrap();
        assert_eq!(wm.find_target_window(Point::new(60, 60)), Some(b));
    }

    #[test]
    fn grab_window_short_circuits_hit_test() {
        let (mut wm, _frames) = manager();
        let _a = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let b = registered(&mut wm, Rect::new(200, 200, 100, 100));
        wm.context_mut().grab_window(b);
        assert_eq!(wm.find_target_window(Point::new(10, 10)), Some(b));

        wm.tree_mut().show(b, false).unwrap();
        assert_ne!(wm.find_target_window(Point::new(10, 10)), Some(b));
    }

    // ── Coordinates ────────────────────────────────────────────────

    #[test]
    fn translate_subtracts_offset_then_scales_up() {
        let (mut wm, _frames) = manager();
        wm.set_input_offset(10, 20);
        wm.set_input_scale(1.5, 0.5);
        assert_eq!(wm.translate_point(Point::new(13, 25)), Point::new(5, 3));
    }

    #[test]
    fn manager_click_uses_ten_pixels() {
        let (mut wm, _frames) = manager();
        registered(&mut wm, Rect::new(0, 0, 100, 100));
        wm.on_pointer_down(Point::new(10, 10));
        wm.on_pointer_move(Point::new(19, 10));
        assert!(wm.is_clicked());
        wm.on_pointer_move(Point::new(20, 10));
        assert!(!wm.is_clicked());
    }

    // ── Routing ────────────────────────────────────────────────────

    #[test]
    fn pointer_down_deselects_other_windows() {
        let (mut wm, _frames) = manager();
        let a = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let b = registered(&mut wm, Rect::new(200, 0, 100, 100));
        let (tree, ctx) = wm.parts_mut();
        tree.set_state(ctx, b, WidgetState::Selected, false);

        wm.on_pointer_down(Point::new(10, 10));
        assert_eq!(wm.target(), Some(a));
        assert_eq!(wm.tree().get(b).unwrap().state, WidgetState::Normal);
        assert!(wm.is_pointer_down());
        wm.on_pointer_up(Point::new(10, 10));
        assert!(!wm.is_pointer_down());
    }

    #[test]
    fn move_between_windows_unwinds_hover() {
        let (mut wm, _frames) = manager();
        let a = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let _b = registered(&mut wm, Rect::new(200, 0, 100, 100));
        let button = wm
            .tree_mut()
            .insert_child(a, WidgetData::new("button", Rect::new(0, 0, 50, 50)))
            .unwrap();

        wm.on_pointer_move(Point::new(10, 10));
        assert_eq!(wm.tree().get(button).unwrap().state, WidgetState::Over);
        wm.on_pointer_move(Point::new(210, 10));
        assert_eq!(wm.tree().get(button).unwrap().state, WidgetState::Normal);
    }

    #[test]
    fn keys_fall_back_to_top_window() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (mut wm, _frames) = manager();
        let win = registered(&mut wm, Rect::new(0, 0, 100, 100));
        let sink = seen.clone();
        wm.tree_mut().get_mut(win).unwrap().handlers.key_down =
            Some(Box::new(move |_, key| sink.borrow_mut().push(key.code)));

        wm.dispatch_pointer_move_out();
        assert_eq!(wm.target(), None);
        wm.on_key_down(KeyEvent::plain(Key::Enter));
        assert_eq!(*seen.borrow(), vec![Key::Enter]);
        assert_eq!(wm.target(), Some(win));
    }

    // ── Frames ─────────────────────────────────────────────────────

    #[test]
    fn frame_paints_and_counts() {
        let (mut wm, frames) = manager();
        registered(&mut wm, Rect::new(0, 0, 100, 100));
        assert_eq!(frames.requests(), 1);

        let mut surface = crate::testing::RecordingSurface::new();
        wm.on_frame(&mut surface, &crate::theme::Theme::new());
        assert_eq!(wm.draw_count(), 1);
        assert!(!surface.calls().is_empty());

        wm.context_mut().post_redraw();
        wm.context_mut().post_redraw();
        assert_eq!(frames.requests(), 2);
    }

    #[test]
    fn paint_disabled_suppresses_frames() {
        let (mut wm, frames) = manager();
        wm.set_paint_enabled(false);
        registered(&mut wm, Rect::new(0, 0, 100, 100));
        assert_eq!(frames.requests(), 0);
        wm.set_paint_enabled(true);
        assert_eq!(frames.requests(), 1);
    }
}

//! The per-widget paint pipeline.
//!
//! Each visible widget paints inside its own save/restore pair, translated
//! to its rect origin: relayout, before-paint hook, background, its own
//! content, children, after-paint hook. Scroll views clip to the viewport
//! and shift their content by the scroll offset, skipping children that are
//! entirely out of view; their bars are painted unshifted on top.

use log::{trace, warn};

use super::{image, DisplayMode, Surface};
use crate::geometry::Rect;
use crate::theme::{Style, ThemeProvider};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{Context, WidgetKind};

#[derive(Clone, Copy)]
enum Hook {
    Before,
    After,
}

impl WidgetTree {
    /// Paint `id` and its subtree. `surface` must be positioned at the
    /// parent's origin.
    pub fn paint(&mut self, ctx: &mut Context, surface: &mut dyn Surface, theme: &dyn ThemeProvider, id: WidgetId) {
        if !self.get(id).is_some_and(|d| d.visible) {
            return;
        }

        surface.save();
        if let Err(err) = self.relayout(ctx, id, false) {
            warn!("relayout failed: {err}");
        }
        let Some(data) = self.get(id) else {
            surface.restore();
            return;
        };
        let rect = data.rect;
        let is_window = matches!(data.kind, WidgetKind::Window(_));
        let is_scroll_view = matches!(data.kind, WidgetKind::ScrollView(_));
        trace!("paint {} at {:?}", data.type_name, rect);

        surface.translate(f64::from(rect.x), f64::from(rect.y));
        self.run_hook(id, surface, Hook::Before);
        if is_window {
            surface.begin_path();
            surface.clear_rect(0.0, 0.0, f64::from(rect.width), f64::from(rect.height));
        }

        let style = self.resolve_style(id, theme);
        self.paint_background(surface, &style, id);
        self.paint_self(surface, &style, id);
        if is_scroll_view {
            self.paint_scrolled_children(ctx, surface, theme, id);
        } else {
            let children = self.children(id).to_vec();
            self.paint_children(ctx, surface, theme, id, &children);
        }

        self.run_hook(id, surface, Hook::After);
        surface.close_path();
        surface.restore();
    }

    fn run_hook(&mut self, id: WidgetId, surface: &mut dyn Surface, hook: Hook) {
        let Some(data) = self.get_mut(id) else {
            return;
        };
        let handler = match hook {
            Hook::Before => data.handlers.before_paint.as_mut(),
            Hook::After => data.handlers.after_paint.as_mut(),
        };
        if let Some(handler) = handler {
            handler(id, surface);
        }
    }

    /// Background image if the style has one, else fill and border.
    fn paint_background(&self, surface: &mut dyn Surface, style: &Style, id: WidgetId) {
        let Some(data) = self.get(id) else {
            return;
        };
        let local = Rect::from_size(data.rect.size());
        if let Some(bg) = &style.bg_image {
            image::draw(surface, bg, data.image_display, local);
            return;
        }

        surface.begin_path();
        surface.rect(0.0, 0.0, f64::from(local.width), f64::from(local.height));
        if let Some(fill) = &style.fill_color {
            surface.set_fill_color(fill);
            surface.fill();
        }
        if let Some(line) = &style.line_color {
            if data.line_width > 0.0 {
                surface.set_line_width(data.line_width);
                surface.set_stroke_color(line);
                surface.stroke();
            }
        }
        surface.begin_path();
    }

    /// Kind-specific content. Only scroll bars draw anything: the dragger,
    /// as a nine-patch foreground image or a plain fill.
    fn paint_self(&self, surface: &mut dyn Surface, style: &Style, id: WidgetId) {
        let Some(dragger) = self
            .get(id)
            .and_then(|d| d.kind.as_scroll_bar())
            .and_then(|bar| bar.dragger())
        else {
            return;
        };
        if let Some(fg) = &style.fg_image {
            image::draw(surface, fg, DisplayMode::NinePatch, dragger);
        } else if let Some(color) = &style.drag_color {
            surface.begin_path();
            surface.rect(
                f64::from(dragger.x),
                f64::from(dragger.y),
                f64::from(dragger.width),
                f64::from(dragger.height),
            );
            surface.set_fill_color(color);
            surface.fill();
        }
    }

    /// Paint `children` in z-order. With paint-focus-later, the hot child is
    /// held back and painted last.
    fn paint_children(
        &mut self,
        ctx: &mut Context,
        surface: &mut dyn Surface,
        theme: &dyn ThemeProvider,
        id: WidgetId,
        children: &[WidgetId],
    ) {
        let focus_later = self.get(id).is_some_and(|d| d.paint_focus_later);
        let mut focus = None;
        for &child in children {
            if focus_later && self.get(child).is_some_and(|c| c.state.is_hot()) {
                focus = Some(child);
                continue;
            }
            self.paint(ctx, surface, theme, child);
        }
        if let Some(child) = focus {
            self.paint(ctx, surface, theme, child);
        }
    }

    fn paint_scrolled_children(
        &mut self,
        ctx: &mut Context,
        surface: &mut dyn Surface,
        theme: &dyn ThemeProvider,
        id: WidgetId,
    ) {
        let Some(data) = self.get(id) else {
            return;
        };
        let Some(view) = data.kind.as_scroll_view() else {
            return;
        };
        let bars = [view.v_bar, view.h_bar];
        let size = data.rect.size();
        let offset = self.scroll_offset(id);
        let viewport = Rect::new(offset.x, offset.y, size.width, size.height);
        let in_view: Vec<_> = self
            .children(id)
            .iter()
            .copied()
            .filter(|c| !bars.contains(c))
            .filter(|&c| self.get(c).is_some_and(|d| d.rect.intersects(viewport)))
            .collect();

        surface.save();
        surface.begin_path();
        surface.rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
        surface.clip();
        surface.translate(-f64::from(offset.x), -f64::from(offset.y));
        self.paint_children(ctx, surface, theme, id, &in_view);
        surface.restore();

        for bar in bars {
            self.paint(ctx, surface, theme, bar);
        }
    }

    /// Draw the tooltip of `id` centered over it, if it is hovered and has
    /// tips text.
    pub fn paint_tips(&self, surface: &mut dyn Surface, theme: &dyn ThemeProvider, id: WidgetId) {
        let Some(data) = self.get(id) else {
            return;
        };
        let Some(tips) = data.tips.as_deref().filter(|t| !t.is_empty()) else {
            return;
        };
        if !data.visible || data.state != crate::widget::WidgetState::Over {
            return;
        }
        let style = self.resolve_style(id, theme);
        let font = style.tips_font.as_ref().or(style.font.as_ref());
        let color = style.tips_text_color.as_ref().or(style.text_color.as_ref());
        let (Some(font), Some(color)) = (font, color) else {
            return;
        };

        let at = self.position_in_view(id);
        let size = data.rect.size();
        surface.save();
        surface.translate(f64::from(at.x), f64::from(at.y));
        surface.begin_path();
        if style.tips_fill_color.is_some() || style.tips_line_color.is_some() {
            surface.rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
            if let Some(fill) = &style.tips_fill_color {
                surface.set_fill_color(fill);
                surface.fill();
            }
            if let Some(line) = &style.tips_line_color {
                surface.set_stroke_color(line);
                surface.stroke();
            }
            surface.begin_path();
        }
        surface.set_font(font);
        surface.set_fill_color(color);
        let width = surface.measure_text(tips);
        surface.fill_text(
            tips,
            (f64::from(size.width) - width) / 2.0,
            f64::from(size.height) / 2.0,
        );
        surface.restore();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::render::{ImageRef, RedrawScheduler};
    use crate::testing::{Call, ManualFrames, RecordingSurface};
    use crate::theme::Theme;
    use crate::tree::WidgetData;
    use crate::widget::{ScrollType, WidgetState};

    fn ctx() -> Context {
        Context::new(RedrawScheduler::new(ManualFrames::new()))
    }

    fn fills(surface: &RecordingSurface) -> Vec<String> {
        surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::SetFillColor(color) => Some(color.clone()),
                _ => None,
            })
            .collect()
    }

    fn theme() -> Theme {
        Theme::new()
            .with_style("window", WidgetState::Normal, Style::new().with_fill_color("win"))
            .with_style("a", WidgetState::Normal, Style::new().with_fill_color("a"))
            .with_style("b", WidgetState::Normal, Style::new().with_fill_color("b"))
            .with_style("b", WidgetState::Over, Style::new().with_fill_color("b-over"))
            .with_style("c", WidgetState::Normal, Style::new().with_fill_color("c"))
    }

    // ── Pipeline ───────────────────────────────────────────────────

    #[test]
    fn window_clears_then_paints_back_to_front() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(10, 20, 100, 100)));
        for key in ["a", "b", "c"] {
            tree.insert_child(win, WidgetData::new(key, Rect::new(0, 0, 10, 10))).unwrap();
        }
        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx(), &mut surface, &theme(), win);

        assert_eq!(surface.calls()[0], Call::Save);
        assert_eq!(surface.calls()[1], Call::Translate(10.0, 20.0));
        assert!(surface.calls().contains(&Call::ClearRect(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(fills(&surface), vec!["win", "a", "b", "c"]);
        assert_eq!(surface.calls().last(), Some(&Call::Restore));
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn hidden_subtree_is_skipped() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)));
        let a = tree.insert_child(win, WidgetData::new("a", Rect::new(0, 0, 10, 10))).unwrap();
        tree.insert_child(a, WidgetData::new("c", Rect::new(0, 0, 5, 5))).unwrap();
        tree.show(a, false).unwrap();

        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx(), &mut surface, &theme(), win);
        assert_eq!(fills(&surface), vec!["win"]);
    }

    #[test]
    fn focus_later_paints_hot_child_last() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)).paint_focus_later(true));
        let mut kids = Vec::new();
        for key in ["a", "b", "c"] {
            kids.push(tree.insert_child(win, WidgetData::new(key, Rect::new(0, 0, 10, 10))).unwrap());
        }
        let mut ctx = ctx();
        tree.set_state(&mut ctx, kids[1], WidgetState::Over, false);

        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx, &mut surface, &theme(), win);
        assert_eq!(fills(&surface), vec!["win", "a", "c", "b-over"]);
    }

    #[test]
    fn paint_hooks_wrap_content() {
        let mut tree = WidgetTree::new();
        let win = tree.insert_root(
            WidgetData::window(Rect::new(0, 0, 50, 50))
                .on_before_paint(|_, s| s.set_font("before"))
                .on_after_paint(|_, s| s.set_font("after")),
        );
        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx(), &mut surface, &theme(), win);

        let fonts: Vec<_> = surface
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::SetFont(f) => Some(f.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fonts, vec!["before", "after"]);
        let before = surface.calls().iter().position(|c| *c == Call::SetFont("before".into()));
        let clear = surface.calls().iter().position(|c| matches!(c, Call::ClearRect(..)));
        assert!(before < clear);
    }

    #[test]
    fn background_image_replaces_fill() {
        let mut tree = WidgetTree::new();
        let w = tree.insert_root(WidgetData::new("a", Rect::new(0, 0, 30, 30)));
        let theme = Theme::new().with_style(
            "a",
            WidgetState::Normal,
            Style::new().with_fill_color("a").with_bg_image(ImageRef::new("bg", 30, 30)),
        );
        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx(), &mut surface, &theme, w);
        assert!(fills(&surface).is_empty());
        assert!(surface
            .calls()
            .iter()
            .any(|c| matches!(c, Call::DrawImage { key, .. } if key == "bg")));
    }

    // ── Scroll views ───────────────────────────────────────────────

    #[test]
    fn scroll_view_clips_translates_and_culls() {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 300, 300)));
        let view = tree.insert_scroll_view(win, Rect::new(0, 0, 100, 200), 8).unwrap();
        for (key, y) in [("a", 0), ("b", 100), ("c", 250)] {
            tree.insert_child(view, WidgetData::new(key, Rect::new(0, y, 100, 50))).unwrap();
        }
        tree.set_scroll_type(view, ScrollType::Auto).unwrap();
        tree.relayout(&mut ctx, view, true).unwrap();
        tree.set_y_offset(&mut ctx, view, 60.0).unwrap();

        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx, &mut surface, &theme(), win);

        assert!(surface.calls().contains(&Call::Clip));
        assert!(surface.calls().contains(&Call::Translate(-0.0, -60.0)));
        // a spans 0..50 and is scrolled out; c starts at 250 and is still in
        // the 60..260 viewport.
        assert_eq!(fills(&surface), vec!["win", "b", "c"]);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn scroll_bar_dragger_uses_drag_color() {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)));
        let bar = tree.insert_scroll_bar(win, "vscroll-bar", Rect::new(90, 0, 10, 100)).unwrap();
        tree.set_scroll_range(bar, 400.0).unwrap();
        tree.set_scroll_position(&mut ctx, bar, 0.0).unwrap();
        let theme = Theme::new().with_style(
            "vscroll-bar",
            WidgetState::Normal,
            Style::new().with_drag_color("grip"),
        );

        let mut surface = RecordingSurface::new();
        tree.paint(&mut ctx, &mut surface, &theme, win);
        assert_eq!(fills(&surface), vec!["grip"]);
    }

    // ── Tips ───────────────────────────────────────────────────────

    #[test]
    fn tips_drawn_only_while_hovered() {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(5, 5, 100, 100)));
        let button = tree
            .insert_child(win, WidgetData::new("a", Rect::new(10, 10, 40, 20)).with_tips("hint"))
            .unwrap();
        let theme = Theme::new().with_style(
            "a",
            WidgetState::Over,
            Style::new().with_font("12px sans").with_text_color("black"),
        );

        let mut surface = RecordingSurface::new();
        tree.paint_tips(&mut surface, &theme, button);
        assert!(surface.calls().is_empty());

        tree.set_state(&mut ctx, button, WidgetState::Over, false);
        tree.paint_tips(&mut surface, &theme, button);
        assert!(surface.calls().contains(&Call::Translate(15.0, 15.0)));
        assert!(surface
            .calls()
            .iter()
            .any(|c| matches!(c, Call::FillText { text, .. } if text == "hint")));
    }

    #[test]
    fn tips_box_uses_fill_and_line_colors() {
        let mut tree = WidgetTree::new();
        let mut ctx = ctx();
        let win = tree.insert_root(WidgetData::window(Rect::new(0, 0, 100, 100)));
        let button = tree
            .insert_child(win, WidgetData::new("a", Rect::new(0, 0, 40, 20)).with_tips("hint"))
            .unwrap();
        let theme = Theme::new().with_style(
            "a",
            WidgetState::Over,
            Style::new()
                .with_tips_fill_color("ivory")
                .with_tips_line_color("gray")
                .with_tips_font("10px mono")
                .with_tips_text_color("black"),
        );
        tree.set_state(&mut ctx, button, WidgetState::Over, false);

        let mut surface = RecordingSurface::new();
        tree.paint_tips(&mut surface, &theme, button);
        let calls = surface.calls();
        assert!(calls.contains(&Call::SetFillColor("ivory".into())));
        assert!(calls.contains(&Call::SetStrokeColor("gray".into())));
        assert!(calls.contains(&Call::Stroke));
        assert_eq!(surface.depth(), 0);
    }
}

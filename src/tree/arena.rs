//! Tree operations: insert, destroy, walk, positions.

use log::{debug, warn};
use slotmap::{SecondaryMap, SlotMap};

use super::node::{WidgetData, WidgetId};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::widget::WidgetKind;

/// Empty slice constant for returning when a widget has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

/// The widget arena.
///
/// All widgets live in a single `SlotMap`. Parent/child and target links are
/// stored in secondary maps, so destroying a subtree is O(subtree size) and
/// every lookup is O(1). `parent` and `target` are non-owning: the only
/// owning edge is parent to children.
pub struct WidgetTree {
    pub(crate) nodes: SlotMap<WidgetId, WidgetData>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    target: SecondaryMap<WidgetId, WidgetId>,
}

impl WidgetTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            target: SecondaryMap::new(),
        }
    }

    /// Insert a widget with no parent (a window, usually).
    pub fn insert_root(&mut self, data: WidgetData) -> WidgetId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Append a widget as the topmost child of `parent` and mark the parent
    /// for relayout.
    pub fn insert_child(&mut self, parent: WidgetId, data: WidgetData) -> Result<WidgetId> {
        let Some(parent_data) = self.nodes.get_mut(parent) else {
            return Err(Error::StaleWidget(parent));
        };
        parent_data.needs_relayout = true;

        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        Ok(id)
    }

    /// Destroy a widget and its whole subtree.
    ///
    /// Children are destroyed before their parent. The widget is detached
    /// from its parent (clearing the parent's target if it pointed here), each
    /// removed widget's `removed` callback runs, and window grabs referring to
    /// any removed widget are cleared. Returns the removed ids in destruction
    /// order, or an empty vec if `id` was already gone.
    pub fn destroy(&mut self, id: WidgetId) -> Vec<WidgetId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&child| child != id);
            }
            if self.target.get(parent) == Some(&id) {
                self.target.remove(parent);
            }
            if let Some(data) = self.nodes.get_mut(parent) {
                data.needs_relayout = true;
            }
        }

        let order = self.post_order(id);
        for &current in &order {
            self.children.remove(current);
            self.parent.remove(current);
            self.target.remove(current);
            if let Some(mut data) = self.nodes.remove(current) {
                if let Some(on_removed) = data.handlers.removed.as_mut() {
                    on_removed(current);
                }
            }
        }

        for (_, data) in self.nodes.iter_mut() {
            if let WidgetKind::Window(window) = &mut data.kind {
                if window.grab.is_some_and(|g| order.contains(&g)) {
                    debug!("clearing grab on destroyed widget");
                    window.grab = None;
                }
            }
        }
        order
    }

    /// Destroy every child of `id`, keeping `id` itself.
    pub fn destroy_children(&mut self, id: WidgetId) -> Vec<WidgetId> {
        let kids = self.children(id).to_vec();
        kids.into_iter().flat_map(|child| self.destroy(child)).collect()
    }

    fn post_order(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![(start, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                result.push(current);
                continue;
            }
            stack.push((current, true));
            for &child in self.children(current).iter().rev() {
                stack.push((child, false));
            }
        }
        result
    }

    /// The parent of a widget, if it has one.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Children in z-order (last is topmost). Empty if `id` has none or does
    /// not exist.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The child currently resolved as hovered/active, if any.
    pub fn target(&self, id: WidgetId) -> Option<WidgetId> {
        self.target
            .get(id)
            .copied()
            .filter(|t| self.nodes.contains_key(*t))
    }

    pub(crate) fn set_target(&mut self, id: WidgetId, target: Option<WidgetId>) {
        match target {
            Some(t) => {
                self.target.insert(id, t);
            }
            None => {
                self.target.remove(id);
            }
        }
    }

    /// Walk from `id` up to the root. Starts with the immediate parent.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// The topmost ancestor of `id` (or `id` itself for a root).
    pub fn root_of(&self, id: WidgetId) -> WidgetId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// The window containing `id`, if its root is a window.
    pub fn window_of(&self, id: WidgetId) -> Option<WidgetId> {
        let root = self.root_of(id);
        matches!(self.nodes.get(root)?.kind, WidgetKind::Window(_)).then_some(root)
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetData> {
        self.nodes.get_mut(id)
    }

    /// Like [`get`](Self::get), but a missing widget is an error.
    pub fn try_get(&self, id: WidgetId) -> Result<&WidgetData> {
        self.nodes.get(id).ok_or(Error::StaleWidget(id))
    }

    pub fn try_get_mut(&mut self, id: WidgetId) -> Result<&mut WidgetData> {
        self.nodes.get_mut(id).ok_or(Error::StaleWidget(id))
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Find a descendant by name. Direct children are checked before
    /// grandchildren.
    pub fn lookup(&self, id: WidgetId, name: &str, recursive: bool) -> Option<WidgetId> {
        let kids = self.children(id);
        let direct = kids
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).and_then(|d| d.name.as_deref()) == Some(name));
        if direct.is_some() || !recursive {
            return direct;
        }
        kids.iter().find_map(|&c| self.lookup(c, name, true))
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    /// Sum of the rect origins of `id` and all its ancestors.
    ///
    /// Scroll offsets are not applied; pointer coordinates routed through a
    /// scroll view are already shifted into content space.
    pub fn abs_position(&self, id: WidgetId) -> Point {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|w| self.nodes.get(w))
            .fold(Point::ZERO, |acc, data| acc + data.rect.origin())
    }

    /// Where `id` currently appears on the canvas, with every scrolling
    /// ancestor's offset subtracted.
    pub fn position_in_view(&self, id: WidgetId) -> Point {
        self.ancestors(id)
            .into_iter()
            .fold(self.abs_position(id), |acc, a| acc - self.scroll_offset(a))
    }

    // -----------------------------------------------------------------------
    // Geometry edits
    // -----------------------------------------------------------------------

    /// Move `id` to a new parent-local position.
    pub fn move_to(&mut self, id: WidgetId, x: i32, y: i32) -> Result<()> {
        let data = self.try_get_mut(id)?;
        data.rect = data.rect.with_origin(Point::new(x, y));
        self.mark_parent_dirty(id);
        Ok(())
    }

    pub fn move_by(&mut self, id: WidgetId, dx: i32, dy: i32) -> Result<()> {
        let rect = self.try_get(id)?.rect;
        self.move_to(id, rect.x + dx, rect.y + dy)
    }

    /// Change the size of `id`. Marks both the widget and its parent for
    /// relayout.
    pub fn resize(&mut self, id: WidgetId, width: i32, height: i32) -> Result<()> {
        let data = self.try_get_mut(id)?;
        data.rect = data.rect.with_size(width, height);
        data.needs_relayout = true;
        self.mark_parent_dirty(id);
        Ok(())
    }

    /// Center `id` inside a `width` x `height` area.
    pub fn move_to_center(&mut self, id: WidgetId, width: i32, height: i32) -> Result<()> {
        let rect = self.try_get(id)?.rect;
        self.move_to(id, (width - rect.width) / 2, (height - rect.height) / 2)
    }

    pub fn show(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        let data = self.try_get_mut(id)?;
        if data.visible != visible {
            data.visible = visible;
            self.mark_parent_dirty(id);
        }
        Ok(())
    }

    /// Show or hide `id` and its whole subtree.
    pub fn show_all(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        for w in self.walk_depth_first(id) {
            self.show(w, visible)?;
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<()> {
        self.try_get_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_selected(&mut self, id: WidgetId, selected: bool) -> Result<()> {
        self.try_get_mut(id)?.selected = selected;
        Ok(())
    }

    fn mark_parent_dirty(&mut self, id: WidgetId) {
        let live = self.nodes.contains_key(id);
        match self.parent(id).and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.needs_relayout = true,
            None if !live => warn!("geometry change on a destroyed widget"),
            None => {}
        }
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

//! Interaction state machine and style resolution.

use log::trace;

use super::Context;
use crate::theme::{Style, ThemeProvider};
use crate::tree::{WidgetData, WidgetId, WidgetTree};

/// Interaction state of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetState {
    #[default]
    Normal,
    Over,
    Active,
    Disable,
    DisableSelected,
    Selected,
}

impl WidgetState {
    /// OVER or ACTIVE: the states a parent tracks through its target.
    pub fn is_hot(self) -> bool {
        matches!(self, WidgetState::Over | WidgetState::Active)
    }
}

/// The state whose style applies to `data`.
pub fn style_state(data: &WidgetData) -> WidgetState {
    let disabled = !data.enabled
        || matches!(data.state, WidgetState::Disable | WidgetState::DisableSelected);
    let selected = data.selectable && data.selected;
    match (disabled, selected) {
        (true, true) => WidgetState::DisableSelected,
        (true, false) => WidgetState::Disable,
        (false, true) => WidgetState::Selected,
        (false, false) => data.state,
    }
}

impl WidgetTree {
    /// Move `id` to `state`.
    ///
    /// A real change fires the state-changed callback. Entering OVER or
    /// ACTIVE requests the widget's cursor, makes it its parent's target
    /// (resetting the previous target to NORMAL), and entering OVER also
    /// makes it the tips widget. With `recursive`, the same state is pushed
    /// down the target chain.
    pub fn set_state(&mut self, ctx: &mut Context, id: WidgetId, state: WidgetState, recursive: bool) {
        let Some(data) = self.nodes.get_mut(id) else {
            return;
        };
        if data.state != state {
            trace!("{} {:?} -> {:?}", data.type_name, data.state, state);
            data.state = state;
            if let Some(changed) = data.handlers.state_changed.as_mut() {
                changed(id, state);
            }
            if state.is_hot() {
                ctx.request_cursor(data.cursor);
                if state == WidgetState::Over {
                    ctx.set_tips(id);
                }
                self.claim_parent_target(ctx, id);
            }
        }

        if recursive {
            if let Some(target) = self.target(id) {
                self.set_state(ctx, target, state, true);
            }
        }
    }

    /// Make `id` its parent's target, demoting a different previous target.
    fn claim_parent_target(&mut self, ctx: &mut Context, id: WidgetId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(previous) = self.target(parent).filter(|&t| t != id) {
            self.set_state(ctx, previous, WidgetState::Normal, true);
        }
        self.set_target(parent, Some(id));
    }

    /// The effective style of `id`, falling back to the NORMAL entry and then
    /// to an empty style.
    pub fn resolve_style(&self, id: WidgetId, theme: &dyn ThemeProvider) -> Style {
        let Some(data) = self.get(id) else {
            return Style::default();
        };
        let key = data.theme_key();
        theme
            .style(key, style_state(data))
            .or_else(|| theme.style(key, WidgetState::Normal))
            .cloned()
            .unwrap_or_default()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

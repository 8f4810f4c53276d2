//! Style records and the theme provider contract.
//!
//! Loading themes from disk is left to the embedding application; a
//! [`Theme`] is filled in programmatically.

use std::collections::HashMap;

use crate::render::ImageRef;
use crate::widget::WidgetState;

/// Paint attributes for one (theme key, state) pair.
///
/// Every field is optional; painting skips whatever is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill_color: Option<String>,
    pub line_color: Option<String>,
    pub font: Option<String>,
    pub text_color: Option<String>,
    pub bg_image: Option<ImageRef>,
    pub fg_image: Option<ImageRef>,
    /// Fill for a scroll bar's dragger when no foreground image is set.
    pub drag_color: Option<String>,
    pub tips_fill_color: Option<String>,
    pub tips_line_color: Option<String>,
    pub tips_text_color: Option<String>,
    pub tips_font: Option<String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn with_line_color(mut self, color: impl Into<String>) -> Self {
        self.line_color = Some(color.into());
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = Some(color.into());
        self
    }

    pub fn with_bg_image(mut self, image: ImageRef) -> Self {
        self.bg_image = Some(image);
        self
    }

    pub fn with_fg_image(mut self, image: ImageRef) -> Self {
        self.fg_image = Some(image);
        self
    }

    pub fn with_drag_color(mut self, color: impl Into<String>) -> Self {
        self.drag_color = Some(color.into());
        self
    }

    pub fn with_tips_fill_color(mut self, color: impl Into<String>) -> Self {
        self.tips_fill_color = Some(color.into());
        self
    }

    pub fn with_tips_text_color(mut self, color: impl Into<String>) -> Self {
        self.tips_text_color = Some(color.into());
        self
    }

    pub fn with_tips_line_color(mut self, color: impl Into<String>) -> Self {
        self.tips_line_color = Some(color.into());
        self
    }

    pub fn with_tips_font(mut self, font: impl Into<String>) -> Self {
        self.tips_font = Some(font.into());
        self
    }
}

/// Source of styles, keyed by widget type (or override key) and state.
pub trait ThemeProvider {
    /// The style for `key` in `state`, or `None` if the theme has no entry.
    fn style(&self, key: &str, state: WidgetState) -> Option<&Style>;
}

/// A map-backed theme.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    entries: HashMap<String, HashMap<WidgetState, Style>>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `style` for `key` in `state` (builder).
    pub fn with_style(mut self, key: impl Into<String>, state: WidgetState, style: Style) -> Self {
        self.set(key, state, style);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, state: WidgetState, style: Style) {
        self.entries.entry(key.into()).or_default().insert(state, style);
    }
}

impl ThemeProvider for Theme {
    fn style(&self, key: &str, state: WidgetState) -> Option<&Style> {
        self.entries.get(key)?.get(&state)
    }
}

//! Fill options.

use crate::layout::LayoutRules;

/// Options controlling how a template is filled.
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Font size of text produced from rich values, in points
    pub rich_font_size: f32,

    /// Uppercase the values of person-name tokens (`NOMBRES`, `NOMBRE_DOCENTE`)
    pub uppercase_names: bool,

    /// Run the certificate layout pass after replacement
    pub apply_layout: bool,

    /// Layout rules for the post-processing pass
    pub layout_rules: LayoutRules,

    /// Replace tokens in headers and footers too
    pub headers_footers: bool,
}

impl FillOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rich-content font size.
    pub fn with_rich_font_size(mut self, size: f32) -> Self {
        self.rich_font_size = size;
        self
    }

    /// Enable or disable uppercasing of person names.
    pub fn with_uppercase_names(mut self, uppercase: bool) -> Self {
        self.uppercase_names = uppercase;
        self
    }

    /// Skip the layout pass.
    pub fn without_layout(mut self) -> Self {
        self.apply_layout = false;
        self
    }

    /// Use custom layout rules.
    pub fn with_layout_rules(mut self, rules: LayoutRules) -> Self {
        self.layout_rules = rules;
        self.apply_layout = true;
        self
    }

    /// Enable or disable header/footer replacement.
    pub fn with_headers_footers(mut self, enabled: bool) -> Self {
        self.headers_footers = enabled;
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            rich_font_size: 11.0,
            uppercase_names: false,
            apply_layout: true,
            layout_rules: LayoutRules::default(),
            headers_footers: true,
        }
    }
}

//! Certificate layout rule set.

use serde::{Deserialize, Serialize};

use crate::markup::strip_tags;
use crate::model::Length;
use crate::template::VariableMap;

/// Configuration of the certificate layout pass.
///
/// The defaults describe the institutional certificate templates; every
/// field can be overridden from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutRules {
    /// Paragraphs starting with this phrase open the legal body
    pub lead_in: String,

    /// Boilerplate substrings marking body paragraphs
    pub body_markers: Vec<String>,

    /// Section titles, matched case-insensitively, never indented
    pub section_titles: Vec<String>,

    /// Signature lines start with one of these
    pub signature_prefixes: Vec<String>,

    /// Signature lines may instead contain this
    pub signature_marker: String,

    /// Left and right indentation of body paragraphs, in inches
    pub body_indent_inches: f64,

    /// A paragraph continues the body when the previous one is indented by
    /// more than this, in inches
    pub propagation_threshold_inches: f64,

    /// Continuation paragraphs must be shorter than this, in characters
    pub propagation_max_chars: usize,

    /// Variable holding the recipient's name
    pub name_variable: String,

    /// The name paragraph must be shorter than this, in characters
    pub name_max_chars: usize,

    /// Space before the name paragraph, in points
    pub name_space_before_pt: f64,

    /// Font size of the name paragraph, in points
    pub name_font_size: f32,

    /// Values shorter than this (in characters) yield no excerpt
    pub excerpt_min_chars: usize,

    /// Characters of an objective or content value used to recognize
    /// paragraphs holding that value
    pub excerpt_chars: usize,

    /// Variables holding the program objective, first non-empty wins
    pub objective_variables: Vec<String>,

    /// Variables holding the program content, first non-empty wins
    pub content_variables: Vec<String>,
}

impl LayoutRules {
    /// Create the default rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::InvalidConfig(e.to_string()))
    }

    /// Set the body indentation.
    pub fn with_body_indent(mut self, inches: f64) -> Self {
        self.body_indent_inches = inches;
        self
    }

    /// Set the name variable.
    pub fn with_name_variable(mut self, name: impl Into<String>) -> Self {
        self.name_variable = name.into();
        self
    }

    /// Add a boilerplate marker.
    pub fn with_body_marker(mut self, marker: impl Into<String>) -> Self {
        self.body_markers.push(marker.into());
        self
    }

    /// Add a section title.
    pub fn with_section_title(mut self, title: impl Into<String>) -> Self {
        self.section_titles.push(title.into());
        self
    }

    pub(crate) fn body_indent(&self) -> Length {
        Length::inches(self.body_indent_inches)
    }

    pub(crate) fn propagation_threshold(&self) -> Length {
        Length::inches(self.propagation_threshold_inches)
    }

    pub(crate) fn name_space_before(&self) -> Length {
        Length::pt(self.name_space_before_pt)
    }

    pub(crate) fn is_section_title(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.section_titles
            .iter()
            .any(|title| lower.contains(&title.to_lowercase()))
    }

    pub(crate) fn is_signature(&self, text: &str) -> bool {
        self.signature_prefixes.iter().any(|p| text.starts_with(p.as_str()))
            || (!self.signature_marker.is_empty() && text.contains(&self.signature_marker))
    }

    pub(crate) fn has_body_marker(&self, text: &str) -> bool {
        (!self.lead_in.is_empty() && text.starts_with(&self.lead_in))
            || self.body_markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// Leading excerpts of the objective and content values.
    pub(crate) fn excerpts(&self, vars: &VariableMap) -> Vec<String> {
        [&self.objective_variables, &self.content_variables]
            .into_iter()
            .filter_map(|names| {
                names
                    .iter()
                    .filter_map(|name| vars.resolve(name))
                    .find(|value| !value.trim().is_empty())
            })
            .map(strip_tags)
            .filter(|value| value.chars().count() > self.excerpt_min_chars)
            .map(|value| value.chars().take(self.excerpt_chars).collect())
            .collect()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            lead_in: "Por su".to_string(),
            body_markers: strings(&[
                "La Universidad Estatal",
                "expide el presente",
                "Gestión de Educación",
                "Escuela de Formación",
                "días del mes de",
                "del mes de",
                "año dos mil",
            ]),
            section_titles: strings(&[
                "Objetivo del programa",
                "OBJETIVO",
                "Contenido del programa",
                "CONTENIDO",
                "Modalidad",
                "MODALIDAD",
            ]),
            signature_prefixes: strings(&["Ph.", "Msc.", "Ing.", "Lic."]),
            signature_marker: "Rector".to_string(),
            body_indent_inches: 1.2,
            propagation_threshold_inches: 0.5,
            propagation_max_chars: 300,
            name_variable: "NOMBRES".to_string(),
            name_max_chars: 100,
            name_space_before_pt: 24.0,
            name_font_size: 22.0,
            excerpt_min_chars: 20,
            excerpt_chars: 30,
            objective_variables: strings(&["OBJETIVO DEL PROGRAMA", "OBJETIVO_PROGRAMA"]),
            content_variables: strings(&["CONTENIDO", "CONTENIDO_PROGRAMA"]),
        }
    }
}

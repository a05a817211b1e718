//! Paragraph and text-level types.
//!
//! A paragraph is an ordered list of runs (fragments of text sharing one
//! formatting record) plus opaque inline content the model does not edit.
//! All offsets are byte offsets into the flattened paragraph text.

use serde::{Deserialize, Serialize};

use crate::parser::xml::XmlElement;

/// A length in twentieths of a point (twips), the unit WordprocessingML uses
/// for indentation and spacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Length(pub i32);

impl Length {
    /// Zero length.
    pub const ZERO: Length = Length(0);

    /// Length from inches.
    pub fn inches(value: f64) -> Self {
        Length((value * 1440.0).round() as i32)
    }

    /// Length from points.
    pub fn pt(value: f64) -> Self {
        Length((value * 20.0).round() as i32)
    }

    /// Raw twips.
    pub fn twips(self) -> i32 {
        self.0
    }

    /// Value in inches.
    pub fn to_inches(self) -> f64 {
        f64::from(self.0) / 1440.0
    }

    /// Value in points.
    pub fn to_pt(self) -> f64 {
        f64::from(self.0) / 20.0
    }
}

/// A paragraph of text content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs and opaque inline elements, in order
    pub content: Vec<InlineContent>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    /// A text run with styling
    Run(Run),

    /// Anything else (bookmarks, hyperlinks, fields, drawings), kept verbatim.
    /// Contributes no text.
    Raw(XmlElement),
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with one plain run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from runs.
    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        Self {
            content: runs.into_iter().map(InlineContent::Run).collect(),
            style: ParagraphStyle::default(),
        }
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.add_run(Run::new(text));
    }

    /// Add a styled run.
    pub fn add_run(&mut self, run: Run) {
        self.content.push(InlineContent::Run(run));
    }

    /// Add a line break run.
    pub fn add_line_break(&mut self) {
        self.add_run(Run::line_break());
    }

    /// Iterate over runs.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| match c {
            InlineContent::Run(r) => Some(r),
            InlineContent::Raw(_) => None,
        })
    }

    /// Iterate mutably over runs.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|c| match c {
            InlineContent::Run(r) => Some(r),
            InlineContent::Raw(_) => None,
        })
    }

    /// Flattened text: the concatenation of all run texts.
    pub fn text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// Length of the flattened text in bytes.
    pub fn text_len(&self) -> usize {
        self.runs().map(|r| r.text.len()).sum()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Style of the run holding the character at `offset` (or of the last run
    /// when `offset` is the end of the text).
    pub fn style_at(&self, offset: usize) -> Option<&TextStyle> {
        let mut pos = 0;
        let mut last = None;
        for run in self.runs() {
            let end = pos + run.text.len();
            if offset >= pos && offset < end {
                return Some(&run.style);
            }
            last = Some(&run.style);
            pos = end;
        }
        last
    }

    /// Replace `[start, end)` of the flattened text with `replacement`.
    ///
    /// The first run intersecting the range receives the replacement and keeps
    /// its formatting; every later intersecting run only loses the
    /// intersecting portion and stays in place, possibly empty. An empty range
    /// is a pure insertion. Returns `false` (and leaves the paragraph untouched)
    /// when the range is out of bounds or not on character boundaries.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) -> bool {
        if !self.is_valid_range(start, end) {
            log::warn!(
                "Ignoring replacement of invalid range {}..{} in paragraph of length {}",
                start,
                end,
                self.text_len()
            );
            return false;
        }

        if start == end {
            return self.insert_text(start, replacement);
        }

        let mut pos = 0;
        let mut replaced = false;
        for run in self.runs_mut() {
            let run_len = run.text.len();
            let run_end = pos + run_len;

            let lo = pos.max(start);
            let hi = run_end.min(end);
            if lo < hi {
                let local_start = lo - pos;
                let local_end = hi - pos;
                let head = &run.text[..local_start];
                let tail = &run.text[local_end..];
                run.text = if replaced {
                    format!("{}{}", head, tail)
                } else {
                    replaced = true;
                    format!("{}{}{}", head, replacement, tail)
                };
            }

            pos = run_end;
        }
        replaced
    }

    /// Delete `[start, end)` of the flattened text.
    pub fn delete_range(&mut self, start: usize, end: usize) -> bool {
        self.replace_range(start, end, "")
    }

    fn insert_text(&mut self, offset: usize, text: &str) -> bool {
        let mut pos = 0;
        let mut target: Option<(usize, usize)> = None;
        for (index, item) in self.content.iter().enumerate() {
            if let InlineContent::Run(run) = item {
                let end = pos + run.text.len();
                if offset >= pos && offset <= end {
                    target = Some((index, offset - pos));
                    if offset < end {
                        break;
                    }
                }
                pos = end;
            }
        }

        match target {
            Some((index, local)) => {
                if let InlineContent::Run(run) = &mut self.content[index] {
                    run.text.insert_str(local, text);
                }
                true
            }
            None => {
                if text.is_empty() {
                    return true;
                }
                self.add_text(text);
                true
            }
        }
    }

    /// Split the run containing `offset` so that new content can be inserted
    /// exactly there. Returns the index into `content` at which to insert.
    ///
    /// Both halves keep the original run's formatting. Offsets at a run
    /// boundary need no split.
    pub fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for index in 0..self.content.len() {
            let InlineContent::Run(run) = &self.content[index] else {
                continue;
            };
            let end = pos + run.text.len();
            if offset == pos {
                return index;
            }
            if offset > pos && offset < end && run.text.is_char_boundary(offset - pos) {
                let local = offset - pos;
                let mut tail = run.clone();
                tail.text = run.text[local..].to_string();
                if let InlineContent::Run(run) = &mut self.content[index] {
                    run.text.truncate(local);
                }
                self.content.insert(index + 1, InlineContent::Run(tail));
                return index + 1;
            }
            if offset == end {
                // Insert after this run, but before any following raw content
                // that sits on the same offset only when no further run starts here.
                let next_run = self.content[index + 1..]
                    .iter()
                    .position(|c| matches!(c, InlineContent::Run(_)));
                return match next_run {
                    Some(_) => index + 1,
                    None => self.content.len(),
                };
            }
            pos = end;
        }
        self.content.len()
    }

    /// Insert runs at a content index (as returned by [`Paragraph::split_at`]).
    pub fn insert_runs(&mut self, index: usize, runs: Vec<Run>) {
        let index = index.min(self.content.len());
        self.content
            .splice(index..index, runs.into_iter().map(InlineContent::Run));
    }

    fn is_valid_range(&self, start: usize, end: usize) -> bool {
        if start > end {
            return false;
        }
        let text = self.text();
        end <= text.len() && text.is_char_boundary(start) && text.is_char_boundary(end)
    }
}

/// A run of text with consistent styling.
///
/// `'\n'` in `text` is a line break and `'\t'` a tab; both are written as
/// their WordprocessingML elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: TextStyle,
}

impl Run {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a run with the given style.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                bold: Some(true),
                ..Default::default()
            },
        )
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                italic: Some(true),
                ..Default::default()
            },
        )
    }

    /// A run holding a single line break.
    pub fn line_break() -> Self {
        Self::new("\n")
    }

    /// Check if this run is exactly one line break.
    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text styling properties.
///
/// Toggles are tri-state: `None` inherits from the paragraph or character
/// style, `Some(false)` switches the property off explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: Option<bool>,

    /// Italic text
    pub italic: Option<bool>,

    /// Underlined text
    pub underline: Option<bool>,

    /// Font name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,

    /// Text color (hex, e.g. "FF0000")
    pub color: Option<String>,

    /// Run properties the model does not interpret, kept verbatim
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<XmlElement>,
}

impl TextStyle {
    /// Whether the run is explicitly bold.
    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    /// Whether the run is explicitly italic.
    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    /// Whether the run is explicitly underlined.
    pub fn is_underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    /// Check if any emphasis is applied.
    pub fn has_styling(&self) -> bool {
        self.is_bold() || self.is_italic() || self.is_underline()
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Paragraph style id (`w:pStyle`)
    pub style_id: Option<String>,

    /// Text alignment
    pub alignment: Option<Alignment>,

    /// Left indentation
    pub left_indent: Option<Length>,

    /// Right indentation
    pub right_indent: Option<Length>,

    /// First line indentation (negative for hanging)
    pub first_line_indent: Option<Length>,

    /// Space before the paragraph
    pub space_before: Option<Length>,

    /// Line spacing multiplier (1.0 = single)
    pub line_spacing: Option<f32>,

    /// Paragraph properties the model does not interpret, kept verbatim
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<XmlElement>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Parse a `w:jc` value.
    pub fn from_jc(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }

    /// The `w:jc` value.
    pub fn as_jc(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

//! Rich-node tree to runs.
//!
//! Everything is emitted into the host paragraph: blocks and list items are
//! separated by line breaks, never by new paragraphs. Tables are collected
//! for the caller to insert after the host paragraph.

use super::parse::{Emphasis, RichBlock, RichNode, TableRequest};
use crate::model::{Alignment, Run, TextStyle};

/// Emission settings.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Font size of emitted text, in points
    pub font_size: f32,

    /// The host paragraph has no text before the insertion point on the
    /// current line
    pub host_line_blank: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            host_line_blank: true,
        }
    }
}

/// Result of emitting a rich block.
#[derive(Debug, Clone, Default)]
pub struct Emitted {
    /// Runs to splice in at the insertion point
    pub runs: Vec<Run>,

    /// Tables to insert after the host paragraph, in order
    pub tables: Vec<TableRequest>,

    /// Alignment requested by the markup
    pub alignment: Option<Alignment>,

    /// Line spacing requested by the markup
    pub line_spacing: Option<f32>,

    /// The value ended with a block, list or heading whose closing break
    /// was never written
    pub ends_with_block: bool,
}

/// Point size of a heading level.
pub fn heading_size(level: u8) -> f32 {
    match level {
        1 => 18.0,
        2 => 16.0,
        3 => 14.0,
        4 => 12.0,
        _ => 11.0,
    }
}

/// Emit a rich block as runs.
pub fn emit(block: &RichBlock, options: &EmitOptions) -> Emitted {
    let mut emitter = Emitter::new(options);
    emitter.nodes(&block.nodes);
    emitter.finish()
}

struct Emitter<'a> {
    options: &'a EmitOptions,
    out: Emitted,
    bold: usize,
    italic: usize,
    underline: usize,
    /// Nothing but whitespace since the last break (or host line start)
    at_line_start: bool,
    /// Something has been emitted
    emitted: bool,
    /// A block ended; the next content starts on a fresh line
    pending_break: bool,
    /// Drop leading whitespace of the next text (after a list marker)
    trim_leading: bool,
    /// Inside a list item: blocks are unwrapped
    list_depth: usize,
}

impl<'a> Emitter<'a> {
    fn new(options: &'a EmitOptions) -> Self {
        Self {
            options,
            out: Emitted::default(),
            bold: 0,
            italic: 0,
            underline: 0,
            at_line_start: options.host_line_blank,
            emitted: false,
            pending_break: false,
            trim_leading: false,
            list_depth: 0,
        }
    }

    fn finish(self) -> Emitted {
        let mut out = self.out;
        out.ends_with_block = self.pending_break && self.emitted && !self.at_line_start;
        out
    }

    fn nodes(&mut self, nodes: &[RichNode]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &RichNode) {
        match node {
            RichNode::Text(text) => self.text(text),
            RichNode::Styled { emphasis, children } => {
                self.counter(*emphasis, true);
                self.nodes(children);
                self.counter(*emphasis, false);
            }
            RichNode::Break => {
                self.flush_pending();
                self.push_break();
            }
            RichNode::Block {
                align,
                line_height,
                blank,
                children,
            } => self.block(*align, *line_height, *blank, children),
            RichNode::List { ordered, items } => self.list(*ordered, items),
            RichNode::Table(request) => self.out.tables.push(request.clone()),
            RichNode::Heading { level, text, align } => self.heading(*level, text, *align),
            RichNode::Passthrough(children) => self.nodes(children),
        }
    }

    fn counter(&mut self, emphasis: Emphasis, enter: bool) {
        let counter = match emphasis {
            Emphasis::Bold => &mut self.bold,
            Emphasis::Italic => &mut self.italic,
            Emphasis::Underline => &mut self.underline,
        };
        if enter {
            *counter += 1;
        } else {
            *counter = counter.saturating_sub(1);
        }
    }

    fn text(&mut self, raw: &str) {
        let collapsed = collapse(raw);
        let blank = collapsed.trim().is_empty();
        if blank && (self.at_line_start || self.pending_break || self.trim_leading) {
            return;
        }
        if collapsed.is_empty() {
            return;
        }

        self.flush_pending();
        let text = if self.at_line_start || self.trim_leading {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if text.is_empty() {
            return;
        }

        let style = TextStyle {
            bold: Some(self.bold > 0),
            italic: Some(self.italic > 0),
            underline: Some(self.underline > 0),
            font_size: Some(self.options.font_size),
            ..Default::default()
        };
        self.out.runs.push(Run::styled(text, style));
        self.emitted = true;
        self.at_line_start = false;
        self.trim_leading = false;
    }

    fn push_break(&mut self) {
        self.out.runs.push(Run::line_break());
        self.emitted = true;
        self.at_line_start = true;
        self.pending_break = false;
    }

    /// Break unless already on a fresh line or nothing has been emitted yet.
    fn break_line(&mut self) {
        if self.emitted && !self.at_line_start {
            self.push_break();
        }
        self.pending_break = false;
    }

    fn flush_pending(&mut self) {
        if self.pending_break {
            self.break_line();
        }
    }

    fn block(
        &mut self,
        align: Option<Alignment>,
        line_height: Option<f32>,
        blank: bool,
        children: &[RichNode],
    ) {
        if self.list_depth > 0 {
            self.nodes(children);
            return;
        }

        if blank {
            self.flush_pending();
            self.push_break();
            return;
        }

        self.break_line();
        if align.is_some() {
            self.out.alignment = align;
        }
        if let Some(height) = line_height {
            self.out.line_spacing = Some(height.max(1.0));
        }
        self.nodes(children);
        self.pending_break = true;
    }

    fn heading(&mut self, level: u8, text: &str, align: Option<Alignment>) {
        if text.is_empty() {
            return;
        }
        if self.list_depth == 0 {
            self.break_line();
            if align.is_some() {
                self.out.alignment = align;
            }
        } else {
            self.flush_pending();
        }

        let style = TextStyle {
            bold: Some(true),
            italic: Some(false),
            underline: Some(false),
            font_size: Some(heading_size(level)),
            ..Default::default()
        };
        self.out.runs.push(Run::styled(text, style));
        self.emitted = true;
        self.at_line_start = false;
        self.trim_leading = false;
        if self.list_depth == 0 {
            self.pending_break = true;
        }
    }

    fn list(&mut self, ordered: bool, items: &[Vec<RichNode>]) {
        if items.is_empty() {
            return;
        }
        let depth = self.list_depth;
        self.pending_break = false;
        if !self.at_line_start {
            self.push_break();
        }

        self.list_depth += 1;
        for (index, item) in items.iter().enumerate() {
            if index > 0 && !self.at_line_start {
                self.push_break();
            }
            self.marker(depth, ordered, index + 1);
            self.nodes(item);
        }
        self.list_depth -= 1;

        if depth == 0 {
            self.pending_break = true;
        }
    }

    fn marker(&mut self, depth: usize, ordered: bool, number: usize) {
        let marker = match (depth, ordered) {
            (0, false) => "• ".to_string(),
            (0, true) => format!("{}. ", number),
            (_, false) => format!("{}○ ", "  ".repeat(depth)),
            (_, true) => format!("{}{}. ", "  ".repeat(depth), number),
        };
        let style = TextStyle {
            font_size: Some(self.options.font_size),
            ..Default::default()
        };
        self.out.runs.push(Run::styled(marker, style));
        self.emitted = true;
        self.at_line_start = false;
        self.trim_leading = true;
    }
}

/// Collapse runs of ASCII whitespace into single spaces.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    fn render(html: &str, host_line_blank: bool) -> Emitted {
        let options = EmitOptions {
            host_line_blank,
            ..Default::default()
        };
        emit(&parse(html).unwrap(), &options)
    }

    fn text_of(emitted: &Emitted) -> String {
        emitted.runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_collapse() {
        assert_eq!(collapse("a \n\t b"), "a b");
        assert_eq!(collapse("  x  "), " x ");
    }

    #[test]
    fn test_inline_emphasis_runs() {
        let out = render("Hola <b>mundo <i>feliz</i></b>", true);
        assert_eq!(text_of(&out), "Hola mundo feliz");
        let last = out.runs.last().unwrap();
        assert!(last.style.is_bold() && last.style.is_italic());
        assert_eq!(last.style.font_size, Some(11.0));
        assert_eq!(out.runs[0].style.bold, Some(false));
    }

    #[test]
    fn test_paragraphs_separated_by_one_break() {
        let out = render("<p>Uno</p>\n<p>Dos</p>", true);
        assert_eq!(text_of(&out), "Uno\nDos");
        assert_eq!(out.runs.iter().filter(|r| r.is_line_break()).count(), 1);
    }

    #[test]
    fn test_first_paragraph_does_not_break_from_host() {
        let out = render("<p>Uno</p>", false);
        assert_eq!(text_of(&out), "Uno");
    }

    #[test]
    fn test_blank_paragraph_is_explicit_break() {
        let out = render("<p>a</p><p>&nbsp;</p><p>b</p>", true);
        assert_eq!(text_of(&out), "a\n\nb");
    }

    #[test]
    fn test_ordered_list_after_host_text() {
        let out = render("<ol><li>Uno</li><li>Dos</li></ol>", false);
        assert_eq!(text_of(&out), "\n1. Uno\n2. Dos");
    }

    #[test]
    fn test_list_on_blank_host_line() {
        let out = render("<ul><li> a </li><li>b</li></ul>", true);
        assert_eq!(text_of(&out), "• a \n• b");
    }

    #[test]
    fn test_nested_list_markers() {
        let out = render("<ul><li>a<ol><li>x</li><li>y</li></ol></li><li>b</li></ul>", true);
        assert_eq!(text_of(&out), "• a\n  1. x\n  2. y\n• b");
    }

    #[test]
    fn test_nested_unordered_marker() {
        let out = render("<ol><li>a<ul><li>x</li></ul></li></ol>", true);
        assert_eq!(text_of(&out), "1. a\n  ○ x");
    }

    #[test]
    fn test_list_item_paragraphs_are_unwrapped() {
        let out = render("<ul><li><p>uno</p></li><li><p>dos</p></li></ul><p>fin</p>", true);
        assert_eq!(text_of(&out), "• uno\n• dos\nfin");
    }

    #[test]
    fn test_heading_is_single_bold_run() {
        let out = render("<p>intro</p><h1>Título <i>uno</i></h1><p>cuerpo</p>", true);
        assert_eq!(text_of(&out), "intro\nTítulo uno\ncuerpo");
        let heading = out.runs.iter().find(|r| r.text == "Título uno").unwrap();
        assert_eq!(heading.style.font_size, Some(18.0));
        assert!(heading.style.is_bold());
        // Nested emphasis is flattened away.
        assert!(!heading.style.is_italic());
    }

    #[test]
    fn test_break_tag() {
        let out = render("uno<br>dos<br/>", true);
        assert_eq!(text_of(&out), "uno\ndos\n");
    }

    #[test]
    fn test_alignment_and_line_spacing() {
        let out = render(r#"<p style="text-align: center; line-height: 0.8">a</p>"#, true);
        assert_eq!(out.alignment, Some(Alignment::Center));
        assert_eq!(out.line_spacing, Some(1.0));

        let out = render(r#"<p style="line-height: 1.5">a</p>"#, true);
        assert_eq!(out.alignment, None);
        assert_eq!(out.line_spacing, Some(1.5));
    }

    #[test]
    fn test_tables_are_collected_not_emitted() {
        let out = render("<p>antes</p><table><tr><td>c</td></tr></table><p>despues</p>", true);
        assert_eq!(out.tables.len(), 1);
        assert_eq!(text_of(&out), "antes\ndespues");
    }

    #[test]
    fn test_ends_with_block() {
        assert!(render("<ul><li>a</li></ul>", true).ends_with_block);
        assert!(render("<h2>Título</h2>", true).ends_with_block);
        assert!(render("<p>uno</p>", false).ends_with_block);
        assert!(!render("texto <b>suelto</b>", true).ends_with_block);
        assert!(!render("<p>uno</p>suelto", true).ends_with_block);
        assert!(!render("uno<br>", true).ends_with_block);
    }

    #[test]
    fn test_heading_sizes() {
        assert_eq!(heading_size(1), 18.0);
        assert_eq!(heading_size(3), 14.0);
        assert_eq!(heading_size(6), 11.0);
    }
}

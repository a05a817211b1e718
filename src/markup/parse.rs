//! HTML fragment to rich-node tree.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Alignment;

/// Deepest element nesting accepted in a rich value.
pub const MAX_DEPTH: usize = 64;

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<(p|br|strong|b|em|i|u|ul|ol|li|table|tr|td|th|div|span|h[1-6]|figure)[\s/>]")
            .expect("valid regex")
    })
}

fn text_align_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)text-align\s*:\s*([a-z]+)").expect("valid regex"))
}

fn line_height_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)line-height\s*:\s*([0-9.]+)").expect("valid regex"))
}

/// Check whether a value carries HTML the converter understands.
pub fn contains_markup(value: &str) -> bool {
    markup_re().is_match(value)
}

/// Text content of an HTML value with tags removed and whitespace collapsed.
pub fn strip_tags(value: &str) -> String {
    if !value.contains('<') {
        return collapse_whitespace(value);
    }
    let fragment = Html::parse_fragment(value);
    collapse_whitespace(&fragment.root_element().text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parsed rich value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichBlock {
    /// Top-level nodes in document order
    pub nodes: Vec<RichNode>,
}

impl RichBlock {
    /// Check if the block has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One node of rich content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RichNode {
    /// Raw text, whitespace not yet collapsed
    Text(String),

    /// Emphasis applied to children
    Styled {
        emphasis: Emphasis,
        children: Vec<RichNode>,
    },

    /// `<br>`
    Break,

    /// `<p>`
    Block {
        align: Option<Alignment>,
        line_height: Option<f32>,
        /// Only whitespace or non-breaking spaces inside
        blank: bool,
        children: Vec<RichNode>,
    },

    /// `<ul>` / `<ol>`; each item is the content of one `<li>`
    List {
        ordered: bool,
        items: Vec<Vec<RichNode>>,
    },

    /// `<table>`
    Table(TableRequest),

    /// `<h1>`..`<h6>`, formatting inside flattened to text
    Heading {
        level: u8,
        text: String,
        align: Option<Alignment>,
    },

    /// Any other element, unwrapped
    Passthrough(Vec<RichNode>),
}

/// Emphasis kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Bold,
    Italic,
    Underline,
}

/// A table to insert after the host paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableRequest {
    /// Rows of cells, as they appear in the markup
    pub rows: Vec<Vec<CellRequest>>,
}

impl TableRequest {
    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// One table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellRequest {
    /// Cell text, whitespace collapsed
    pub text: String,

    /// Came from `<th>`
    pub header: bool,
}

/// Parse an HTML fragment into rich nodes.
///
/// The HTML parser itself never fails; the only error is nesting deeper
/// than [`MAX_DEPTH`].
pub fn parse(html: &str) -> Result<RichBlock> {
    let fragment = Html::parse_fragment(html);
    let nodes = convert_children(fragment.root_element(), 0)?;
    Ok(RichBlock { nodes })
}

fn convert_children(element: ElementRef, depth: usize) -> Result<Vec<RichNode>> {
    let mut nodes = Vec::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = text;
            if !text.is_empty() {
                nodes.push(RichNode::Text(text.to_string()));
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if let Some(node) = convert_element(child_element, depth + 1)? {
                nodes.push(node);
            }
        }
    }
    Ok(nodes)
}

fn convert_element(element: ElementRef, depth: usize) -> Result<Option<RichNode>> {
    if depth > MAX_DEPTH {
        return Err(Error::Markup(format!(
            "markup nested deeper than {} elements",
            MAX_DEPTH
        )));
    }

    let name = element.value().name();
    let node = match name {
        "script" | "style" | "head" | "title" | "template" => return Ok(None),
        "br" => RichNode::Break,
        "strong" | "b" => styled(Emphasis::Bold, element, depth)?,
        "em" | "i" => styled(Emphasis::Italic, element, depth)?,
        "u" => styled(Emphasis::Underline, element, depth)?,
        "p" => RichNode::Block {
            align: alignment_of(element),
            line_height: line_height_of(element),
            blank: is_blank(element),
            children: convert_children(element, depth)?,
        },
        "ul" | "ol" => {
            let mut items = Vec::new();
            for li in element.children().filter_map(ElementRef::wrap) {
                if li.value().name() == "li" {
                    items.push(convert_children(li, depth + 1)?);
                }
            }
            RichNode::List {
                ordered: name == "ol",
                items,
            }
        }
        "table" => RichNode::Table(table_request(element)),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => RichNode::Heading {
            level: name[1..].parse().unwrap_or(1),
            text: collapse_whitespace(&element.text().collect::<String>()),
            align: alignment_of(element),
        },
        "figure" => {
            let table = element
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "table");
            match table {
                Some(table) => RichNode::Table(table_request(table)),
                None => RichNode::Passthrough(convert_children(element, depth)?),
            }
        }
        _ => RichNode::Passthrough(convert_children(element, depth)?),
    };
    Ok(Some(node))
}

fn styled(emphasis: Emphasis, element: ElementRef, depth: usize) -> Result<RichNode> {
    Ok(RichNode::Styled {
        emphasis,
        children: convert_children(element, depth)?,
    })
}

fn is_blank(element: ElementRef) -> bool {
    element
        .text()
        .all(|t| t.chars().all(|c| c.is_whitespace() || c == '\u{a0}'))
        && !element
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|e| matches!(e.value().name(), "table" | "ul" | "ol" | "img"))
}

/// Alignment from `class` tokens (`text-center`, `align-right`, ...), the
/// inline `text-align` style or the legacy `align` attribute.
fn alignment_of(element: ElementRef) -> Option<Alignment> {
    let value = element.value();

    if let Some(class) = value.attr("class") {
        for token in class.split_whitespace() {
            let keyword = token
                .strip_prefix("text-")
                .or_else(|| token.strip_prefix("align-"));
            if let Some(alignment) = keyword.and_then(alignment_keyword) {
                return Some(alignment);
            }
        }
    }

    if let Some(style) = value.attr("style") {
        if let Some(caps) = text_align_re().captures(style) {
            if let Some(alignment) = alignment_keyword(&caps[1]) {
                return Some(alignment);
            }
        }
    }

    value.attr("align").and_then(alignment_keyword)
}

fn alignment_keyword(keyword: &str) -> Option<Alignment> {
    match keyword.to_ascii_lowercase().as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "justify" => Some(Alignment::Justify),
        _ => None,
    }
}

fn line_height_of(element: ElementRef) -> Option<f32> {
    let style = element.value().attr("style")?;
    let caps = line_height_re().captures(style)?;
    caps[1].parse::<f32>().ok().filter(|v| *v > 0.0)
}

fn table_request(table: ElementRef) -> TableRequest {
    let mut rows = Vec::new();
    for tr in table_rows(table) {
        let cells: Vec<CellRequest> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"))
            .map(|c| CellRequest {
                text: collapse_whitespace(&c.text().collect::<String>()),
                header: c.value().name() == "th",
            })
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    TableRequest { rows }
}

/// Rows of a table, looking through `thead`/`tbody`/`tfoot` but not into
/// nested tables.
fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

//! Certificate layout pass, run after placeholder replacement.
//!
//! Top-level body paragraphs that belong to the legal text get symmetric
//! indentation, the paragraph holding the recipient's name is enlarged, and
//! table cell paragraphs have their indentation cleared. All assignments
//! are absolute, so running the pass twice equals running it once.

mod rules;

pub use rules::LayoutRules;

use crate::model::{Block, Document, Length};
use crate::template::VariableMap;

/// Paragraphs changed by a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Body paragraphs indented
    pub indented: usize,

    /// Paragraphs formatted as the recipient's name
    pub names: usize,

    /// Table cell paragraphs with indentation cleared
    pub cells_cleared: usize,
}

/// Apply the layout rules to a filled document.
///
/// `uppercase_names` must match the setting used for replacement so that
/// the name paragraph is found.
pub fn apply(
    doc: &mut Document,
    vars: &VariableMap,
    rules: &LayoutRules,
    uppercase_names: bool,
) -> LayoutSummary {
    let mut summary = LayoutSummary::default();
    let excerpts = rules.excerpts(vars);
    let name = vars
        .resolve_cased(&rules.name_variable, uppercase_names)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let mut previous_indent: Option<Option<Length>> = None;
    for paragraph in doc.paragraphs_mut() {
        let text = paragraph.text();
        let text = text.trim();
        let previous = previous_indent.replace(paragraph.style.left_indent);

        if text.is_empty() || excerpts.iter().any(|e| text.contains(e.as_str())) {
            continue;
        }

        if is_body(text, previous, rules) {
            paragraph.style.left_indent = Some(rules.body_indent());
            paragraph.style.right_indent = Some(rules.body_indent());
            summary.indented += 1;
        }

        if let Some(name) = &name {
            if text.chars().count() < rules.name_max_chars && text.contains(name.as_str()) {
                paragraph.style.space_before = Some(rules.name_space_before());
                for run in paragraph.runs_mut() {
                    run.style.font_size = Some(rules.name_font_size);
                }
                summary.names += 1;
            }
        }

        previous_indent = Some(paragraph.style.left_indent);
    }

    summary.cells_cleared = clear_cell_indents(&mut doc.body);
    log::debug!(
        "Layout: {} body paragraphs indented, {} name paragraphs, {} cell paragraphs cleared",
        summary.indented,
        summary.names,
        summary.cells_cleared
    );
    summary
}

/// Body test for a non-empty, trimmed paragraph text. `previous` is the left
/// indent of the preceding top-level paragraph, `None` for the first one.
fn is_body(text: &str, previous: Option<Option<Length>>, rules: &LayoutRules) -> bool {
    if rules.is_section_title(text) {
        return false;
    }
    if rules.has_body_marker(text) {
        return true;
    }

    let continues = matches!(previous, Some(Some(indent)) if indent > rules.propagation_threshold());
    continues && text.chars().count() < rules.propagation_max_chars && !rules.is_signature(text)
}

fn clear_cell_indents(blocks: &mut [Block]) -> usize {
    let mut cleared = 0;
    for block in blocks {
        let Block::Table(table) = block else {
            continue;
        };
        for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
            for inner in cell.blocks.iter_mut() {
                if let Block::Paragraph(p) = inner {
                    p.style.left_indent = Some(Length::ZERO);
                    p.style.right_indent = Some(Length::ZERO);
                    cleared += 1;
                }
            }
            cleared += clear_cell_indents(&mut cell.blocks);
        }
    }
    cleared
}

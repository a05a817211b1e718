//! Plain text rendering for Word documents.

use crate::error::Result;
use crate::model::{Block, Document};

use super::RenderOptions;

/// Convert a document to plain text.
///
/// Paragraphs become lines and table cells are separated by tabs. Raw
/// blocks contribute nothing.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut sections = Vec::new();

    if options.include_headers_footers {
        sections.extend(doc.headers.iter().map(|h| render_blocks(&h.blocks, options)));
    }
    sections.push(render_blocks(&doc.body, options));
    if options.include_headers_footers {
        sections.extend(doc.footers.iter().map(|f| render_blocks(&f.blocks, options)));
    }

    let output = sections
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(output.trim().to_string())
}

fn render_blocks(blocks: &[Block], options: &RenderOptions) -> String {
    blocks
        .iter()
        .filter(|b| !matches!(b, Block::Raw(_)))
        .map(|b| {
            let text = b.plain_text();
            if options.join_line_breaks {
                text.replace('\n', " ")
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

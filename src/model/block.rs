//! Block-level content.

use serde::{Deserialize, Serialize};

use super::{Paragraph, Table};
use crate::parser::xml::XmlElement;

/// A block-level element inside a body, table cell, header or footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Text paragraph
    Paragraph(Paragraph),

    /// Table
    Table(Table),

    /// Anything else (section properties, content controls, ...), written
    /// back unchanged
    Raw(XmlElement),
}

impl Block {
    /// Borrow as paragraph.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Mutably borrow as paragraph.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Borrow as table.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Plain text of the block. Raw blocks yield nothing.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.text(),
            Block::Table(t) => t.plain_text(),
            Block::Raw(_) => String::new(),
        }
    }
}

impl From<Paragraph> for Block {
    fn from(paragraph: Paragraph) -> Self {
        Block::Paragraph(paragraph)
    }
}

impl From<Table> for Block {
    fn from(table: Table) -> Self {
        Block::Table(table)
    }
}

/// Count paragraphs in a block list, descending into tables.
pub fn count_paragraphs(blocks: &[Block]) -> usize {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(_) => 1,
            Block::Table(t) => t
                .rows
                .iter()
                .flat_map(|r| &r.cells)
                .map(|c| count_paragraphs(&c.blocks))
                .sum(),
            Block::Raw(_) => 0,
        })
        .sum()
}

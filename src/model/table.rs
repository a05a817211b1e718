//! Table types.

use serde::{Deserialize, Serialize};

use super::{Block, Paragraph};
use crate::parser::xml::XmlElement;

/// A table structure.
///
/// Table-, grid-, row- and cell-level properties are kept as raw property
/// elements; only the cell contents are modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table properties (`w:tblPr`)
    pub properties: Option<XmlElement>,

    /// Column grid (`w:tblGrid`)
    pub grid: Option<XmlElement>,

    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row and column.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Style id declared in the table properties, if any.
    pub fn style_id(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.child("w:tblStyle"))
            .and_then(|s| s.attr("w:val"))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Row-level property elements (`w:tblPrEx`, `w:trPr`) in source order
    pub properties: Vec<XmlElement>,

    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            properties: Vec::new(),
            cells,
        }
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell properties (`w:tcPr`)
    pub properties: Option<XmlElement>,

    /// Cell content. Word requires at least one paragraph.
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a cell holding one paragraph.
    pub fn with_paragraph(paragraph: Paragraph) -> Self {
        Self {
            properties: None,
            blocks: vec![Block::Paragraph(paragraph)],
        }
    }

    /// Create a cell with plain text.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_paragraph(Paragraph::with_text(content))
    }

    /// Iterate over the cell's direct paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dimensions() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("A")]));
        table.add_row(TableRow::new(vec![TableCell::text("B"), TableCell::text("C")]));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(1, 1).unwrap().plain_text(), "C");
        assert!(table.cell(0, 1).is_none());
        assert_eq!(table.plain_text(), "A\nB\tC");
    }

    #[test]
    fn test_style_id() {
        let mut table = Table::new();
        assert_eq!(table.style_id(), None);
        table.properties = Some(
            XmlElement::new("w:tblPr")
                .with_child(XmlElement::new("w:tblStyle").with_attr("w:val", "TableGrid")),
        );
        assert_eq!(table.style_id(), Some("TableGrid"));
    }
}

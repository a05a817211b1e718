//! Document model types for Word content representation.
//!
//! The model covers what templating edits (paragraphs, runs, tables and
//! their formatting) and keeps everything else as raw XML so that a parsed
//! document saves back without losing content.

mod block;
mod document;
mod paragraph;
mod table;

pub use block::{count_paragraphs, Block};
pub use document::{
    Document, HeaderFooter, Metadata, Package, SectionPartKind, CORE_PART, DOCUMENT_PART,
};
pub(crate) use document::Part;
pub use paragraph::{Alignment, InlineContent, Length, Paragraph, ParagraphStyle, Run, TextStyle};
pub use table::{Table, TableCell, TableRow};

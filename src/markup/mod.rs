//! Rich-text (HTML) values converted into Word content.
//!
//! Values coming from a WYSIWYG editor are parsed into a small tree of
//! [`RichNode`]s, then emitted as runs for the host paragraph plus table
//! requests that become real tables next to it.

mod emit;
mod parse;
mod table;

pub use emit::{emit, heading_size, EmitOptions, Emitted};
pub use parse::{
    contains_markup, parse, strip_tags, CellRequest, Emphasis, RichBlock, RichNode, TableRequest,
    MAX_DEPTH,
};
pub use table::{build_table, TABLE_GRID_STYLE};

//! Template filling: placeholder scanning, variable resolution and
//! replacement.

mod dates;
mod options;
mod replacer;
mod rich;
mod scanner;
mod variables;

pub use dates::{month_name, DateStyle};
pub use options::FillOptions;
pub use replacer::{ReplaceReport, VariableReplacer};
pub use rich::{insert_plain, insert_rich, is_rich_variable, RichInsertion, RICH_VARIABLES};
pub use scanner::{find_next, scan, scan_document, Placeholder};
pub use variables::{normalize_name, VariableMap};

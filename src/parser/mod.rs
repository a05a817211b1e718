//! DOCX parsing module.

mod docx;
mod options;
pub mod xml;

pub use docx::DocxParser;
pub use options::{ErrorMode, ParseOptions};

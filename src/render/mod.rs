//! Rendering module: saving documents back to `.docx` and dumping them as
//! text or JSON.

pub mod docx;
mod json;
mod options;
mod text;

pub use json::{to_json, JsonFormat};
pub use options::{Compression, RenderOptions, SaveOptions};
pub use text::to_text;

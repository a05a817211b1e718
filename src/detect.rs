//! DOCX format detection and validation.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::DOCUMENT_PART;

/// DOCX package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Number of parts in the package
    pub part_count: usize,
    /// Whether the package carries a VBA project (`.docm`)
    pub macro_enabled: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.macro_enabled { "DOCM" } else { "DOCX" };
        write!(f, "{} ({} parts)", kind, self.part_count)
    }
}

/// Zip local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect DOCX format from a file path.
///
/// # Example
/// ```no_run
/// use docfill::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 4];
    if file.read_exact(&mut header).is_err() || header != ZIP_MAGIC {
        return Err(Error::UnknownFormat);
    }
    file.rewind()?;
    inspect_archive(file)
}

/// Detect DOCX format from the complete file contents.
///
/// Returns `Err(Error::UnknownFormat)` when the data is not a zip archive or
/// the archive has no `word/document.xml` part.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }
    inspect_archive(Cursor::new(data))
}

fn inspect_archive<R: Read + Seek>(reader: R) -> Result<DocxFormat> {
    let archive = ZipArchive::new(reader)?;
    let mut has_document = false;
    let mut macro_enabled = false;
    for name in archive.file_names() {
        if name == DOCUMENT_PART {
            has_document = true;
        }
        if name.ends_with("vbaProject.bin") {
            macro_enabled = true;
        }
    }

    if !has_document {
        return Err(Error::UnknownFormat);
    }

    Ok(DocxFormat {
        part_count: archive.len(),
        macro_enabled,
    })
}

/// Check if a file is a Word package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes hold a Word package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

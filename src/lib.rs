//! # docfill
//!
//! Fill Word (`.docx`) certificate templates.
//!
//! `{{TOKEN}}` placeholders are replaced with values from a variable map,
//! even when Word has split a placeholder across several runs. Rich-text
//! (HTML) values become native runs, inline lists and tables, and
//! certificate layout rules are applied afterwards.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{fill_file, SaveOptions, VariableMap};
//!
//! fn main() -> docfill::Result<()> {
//!     let vars = VariableMap::from_pairs([
//!         ("NOMBRES", "Juan Pérez"),
//!         ("CONTENIDO", "<ol><li>Uno</li><li>Dos</li></ol>"),
//!     ]);
//!
//!     let filled = fill_file("plantilla.docx", &vars)?;
//!     filled.save("certificado.docx", &SaveOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run-aware replacement**: placeholders split across runs keep the
//!   formatting of the run that started them
//! - **Rich values**: bold/italic/underline, line breaks, lists, headings
//!   and tables from HTML
//! - **Layout rules**: certificate body indentation and name emphasis,
//!   configurable through [`LayoutRules`]
//! - **Lossless packages**: unknown XML and parts are written back as read
//! - **Batch generation**: many documents from one template, in parallel

pub mod batch;
pub mod detect;
pub mod error;
pub mod layout;
pub mod markup;
pub mod model;
pub mod parser;
pub mod render;
pub mod template;

// Re-export commonly used types
pub use batch::{fill_batch, fill_batch_to_bytes};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use layout::LayoutRules;
pub use model::{
    Alignment, Block, Document, HeaderFooter, InlineContent, Length, Metadata, Paragraph,
    ParagraphStyle, Run, Table, TableCell, TableRow, TextStyle,
};
pub use parser::{DocxParser, ErrorMode, ParseOptions};
pub use render::{Compression, JsonFormat, RenderOptions, SaveOptions};
pub use template::{
    scan_document, DateStyle, FillOptions, ReplaceReport, VariableMap, VariableReplacer,
};

use std::io::Read;
use std::path::Path;

/// Parse a `.docx` file into a document.
///
/// # Example
///
/// ```no_run
/// use docfill::parse_file;
///
/// let doc = parse_file("plantilla.docx").unwrap();
/// println!("Paragraphs: {}", doc.paragraphs().count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = DocxParser::open(path)?;
    parser.parse()
}

/// Parse a `.docx` file with custom options.
///
/// # Example
///
/// ```no_run
/// use docfill::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().body_only();
/// let doc = parse_file_with_options("plantilla.docx", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a `.docx` from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = DocxParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a `.docx` from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a `.docx` from a reader.
///
/// # Example
///
/// ```no_run
/// use docfill::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("plantilla.docx").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = DocxParser::from_reader(reader)?;
    parser.parse()
}

/// Parse a `.docx` from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::from_reader_with_options(reader, options)?;
    parser.parse()
}

/// Parse a `.docx` file without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn parse_file_async<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = tokio::fs::read(path).await?;
    parse_bytes(&data)
}

/// Fill a parsed template in place with default options.
pub fn fill_document(doc: &mut Document, vars: &VariableMap) -> ReplaceReport {
    VariableReplacer::new().replace(doc, vars)
}

/// Parse and fill a template file with default options.
///
/// # Example
///
/// ```no_run
/// use docfill::{fill_file, VariableMap};
///
/// let vars = VariableMap::from_json_str(r#"{"NOMBRES": "Ana"}"#).unwrap();
/// let filled = fill_file("plantilla.docx", &vars).unwrap();
/// assert!(filled.report.is_complete());
/// ```
pub fn fill_file<P: AsRef<Path>>(path: P, vars: &VariableMap) -> Result<FilledDocument> {
    DocFill::new().fill(path, vars)
}

/// Parse and fill a template held in memory, returning `.docx` bytes.
pub fn fill_bytes(data: &[u8], vars: &VariableMap) -> Result<Vec<u8>> {
    DocFill::new().fill_bytes(data, vars)?.to_bytes()
}

/// Extract plain text from a `.docx` file.
///
/// # Example
///
/// ```no_run
/// use docfill::extract_text;
///
/// let text = extract_text("certificado.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(doc.plain_text())
}

/// Render a `.docx` file as plain text, headers and footers included.
pub fn to_text<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_text(&doc, options)
}

/// Dump the document model of a `.docx` file as JSON.
///
/// # Example
///
/// ```no_run
/// use docfill::{to_json, JsonFormat};
///
/// let json = to_json("plantilla.docx", JsonFormat::Pretty).unwrap();
/// std::fs::write("plantilla.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for parsing, filling and saving templates.
///
/// # Example
///
/// ```no_run
/// use docfill::{DocFill, VariableMap};
///
/// let vars = VariableMap::from_pairs([("NOMBRES", "Ana")]);
/// DocFill::new()
///     .lenient()
///     .with_rich_font_size(12.0)
///     .stored()
///     .fill("plantilla.docx", &vars)?
///     .save_to("certificado.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocFill {
    parse_options: ParseOptions,
    fill_options: FillOptions,
    save_options: SaveOptions,
}

impl DocFill {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Ignore headers and footers.
    pub fn body_only(mut self) -> Self {
        self.parse_options = self.parse_options.body_only();
        self.fill_options = self.fill_options.with_headers_footers(false);
        self
    }

    /// Set the font size of rich-value text.
    pub fn with_rich_font_size(mut self, size: f32) -> Self {
        self.fill_options = self.fill_options.with_rich_font_size(size);
        self
    }

    /// Uppercase person-name values.
    pub fn with_uppercase_names(mut self) -> Self {
        self.fill_options = self.fill_options.with_uppercase_names(true);
        self
    }

    /// Skip the certificate layout pass.
    pub fn without_layout(mut self) -> Self {
        self.fill_options = self.fill_options.without_layout();
        self
    }

    /// Use custom layout rules.
    pub fn with_layout_rules(mut self, rules: LayoutRules) -> Self {
        self.fill_options = self.fill_options.with_layout_rules(rules);
        self
    }

    /// Use custom fill options.
    pub fn with_fill_options(mut self, options: FillOptions) -> Self {
        self.fill_options = options;
        self
    }

    /// Set the zip compression of saved documents.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.save_options = self.save_options.with_compression(compression);
        self
    }

    /// Store saved parts uncompressed.
    pub fn stored(mut self) -> Self {
        self.save_options = self.save_options.stored();
        self
    }

    /// Stamp the modification date when saving.
    pub fn touch_modified(mut self) -> Self {
        self.save_options = self.save_options.with_touch_modified(true);
        self
    }

    /// Parse and fill a template file.
    pub fn fill<P: AsRef<Path>>(self, path: P, vars: &VariableMap) -> Result<FilledDocument> {
        let parser = DocxParser::open_with_options(path, self.parse_options.clone())?;
        let document = parser.parse()?;
        Ok(self.fill_document(document, vars))
    }

    /// Parse and fill a template held in memory.
    pub fn fill_bytes(self, data: &[u8], vars: &VariableMap) -> Result<FilledDocument> {
        let parser = DocxParser::from_bytes_with_options(data, self.parse_options.clone())?;
        let document = parser.parse()?;
        Ok(self.fill_document(document, vars))
    }

    /// Fill an already parsed template.
    pub fn fill_document(self, mut document: Document, vars: &VariableMap) -> FilledDocument {
        let report = VariableReplacer::with_options(self.fill_options).replace(&mut document, vars);
        FilledDocument {
            document,
            report,
            save_options: self.save_options,
        }
    }

    /// Parse a template and fill it once per record, in parallel.
    pub fn fill_batch<P: AsRef<Path>>(
        &self,
        path: P,
        records: &[VariableMap],
    ) -> Result<Vec<FilledDocument>> {
        let parser = DocxParser::open_with_options(path, self.parse_options.clone())?;
        let template = parser.parse()?;
        let mut filled = batch::fill_batch(&template, records, &self.fill_options);
        for doc in &mut filled {
            doc.save_options = self.save_options.clone();
        }
        Ok(filled)
    }
}

/// A filled document with its replacement report.
#[derive(Debug, Clone)]
pub struct FilledDocument {
    /// The filled document
    pub document: Document,

    /// What the replacement pass did
    pub report: ReplaceReport,

    /// Options used by [`FilledDocument::to_bytes`] and
    /// [`FilledDocument::save_to`]
    pub(crate) save_options: SaveOptions,
}

impl FilledDocument {
    /// Serialize to `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document.to_bytes(&self.save_options)
    }

    /// Save to a `.docx` file with explicit options.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<()> {
        self.document.save(path, options)
    }

    /// Save to a `.docx` file with the builder's options.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.document.save(path, &self.save_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &RenderOptions::default())
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docfill_builder() {
        let builder = DocFill::new()
            .lenient()
            .body_only()
            .without_layout()
            .with_rich_font_size(12.0)
            .stored();

        assert!(matches!(
            builder.parse_options.error_mode,
            parser::ErrorMode::Lenient
        ));
        assert!(!builder.parse_options.headers_footers);
        assert!(!builder.fill_options.headers_footers);
        assert!(!builder.fill_options.apply_layout);
        assert_eq!(builder.fill_options.rich_font_size, 12.0);
        assert_eq!(builder.save_options.compression, Compression::Stored);
    }

    #[test]
    fn test_docfill_builder_default() {
        let builder = DocFill::default();
        assert!(builder.fill_options.apply_layout);
        assert!(!builder.save_options.touch_modified);
    }

    #[test]
    fn test_layout_rules_enable_layout() {
        let builder = DocFill::new()
            .without_layout()
            .with_layout_rules(LayoutRules::default().with_body_indent(1.0));
        assert!(builder.fill_options.apply_layout);
        assert_eq!(builder.fill_options.layout_rules.body_indent_inches, 1.0);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_parse_bytes_empty_data() {
        let data: [u8; 0] = [];
        assert!(parse_bytes(&data).is_err());
    }

    #[test]
    fn test_parse_bytes_not_zip() {
        let data = b"<!DOCTYPE html><html></html>";
        assert!(matches!(parse_bytes(data), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_fill_bytes_invalid_data() {
        let vars = VariableMap::new();
        assert!(fill_bytes(b"PK\x03\x04 not really", &vars).is_err());
    }

    #[test]
    fn test_fill_document_roundtrip_through_bytes() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Hola {{NOMBRES}}"));
        let bytes = doc.to_bytes(&SaveOptions::default()).unwrap();

        let vars = VariableMap::from_pairs([("NOMBRES", "Ana")]);
        let filled = DocFill::new().fill_bytes(&bytes, &vars).unwrap();
        assert_eq!(filled.document.plain_text(), "Hola Ana");

        let reparsed = parse_bytes(&filled.to_bytes().unwrap()).unwrap();
        assert_eq!(reparsed.plain_text(), "Hola Ana");
    }

    #[test]
    fn test_fill_document_helper() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("{{A}} {{B}}"));
        let report = fill_document(&mut doc, &VariableMap::from_pairs([("A", "1")]));
        assert_eq!(report.replaced, 1);
        assert_eq!(report.unresolved, vec!["B"]);
    }

    #[test]
    fn test_json_formats_describe_same_document() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Certifica a Ana"));

        let pretty = render::to_json(&doc, JsonFormat::Pretty).unwrap();
        let compact = render::to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        assert!(compact.len() < pretty.len());

        let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(pretty, compact);
        assert_eq!(pretty["body"][0]["content"][0]["text"], "Certifica a Ana");
    }
}

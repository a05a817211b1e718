//! Document-level types.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Block, Paragraph, Table};
use crate::error::Result;
use crate::parser::xml::XmlElement;
use crate::render::SaveOptions;

/// Main document part name.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Core properties part name.
pub const CORE_PART: &str = "docProps/core.xml";

/// A Word document: the editable body, headers and footers, plus the rest of
/// the package carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Body content in document order
    pub body: Vec<Block>,

    /// Header parts
    pub headers: Vec<HeaderFooter>,

    /// Footer parts
    pub footers: Vec<HeaderFooter>,

    /// Style ids declared in `word/styles.xml`
    pub style_ids: BTreeSet<String>,

    /// Package parts and XML shells
    #[serde(skip)]
    pub package: Package,
}

impl Document {
    /// Create a blank document that can be saved as a valid `.docx`.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            body: Vec::new(),
            headers: Vec::new(),
            footers: Vec::new(),
            style_ids: ["Normal", "TableGrid"]
                .into_iter()
                .map(String::from)
                .collect(),
            package: Package::blank(),
        }
    }

    /// Top-level body paragraphs (paragraphs inside tables are not included).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(Block::as_paragraph)
    }

    /// Mutable top-level body paragraphs.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(Block::as_paragraph_mut)
    }

    /// Top-level body tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(Block::as_table)
    }

    /// Add a paragraph to the end of the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Check whether the styles part declares a style id.
    pub fn has_style(&self, style_id: &str) -> bool {
        self.style_ids.contains(style_id)
    }

    /// Check if the body has no visible text and no tables.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|block| match block {
            Block::Paragraph(p) => p.is_empty(),
            Block::Table(_) => false,
            Block::Raw(_) => true,
        })
    }

    /// Plain text of the body, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .filter(|b| !matches!(b, Block::Raw(_)))
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize to `.docx` bytes.
    pub fn to_bytes(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        crate::render::docx::to_bytes(self, options)
    }

    /// Save to a `.docx` file.
    pub fn save(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
        let bytes = self.to_bytes(options)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a header or footer reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionPartKind {
    /// Default header/footer
    #[default]
    Default,
    /// First page
    First,
    /// Even pages
    Even,
}

/// A header or footer part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Package part name (e.g. `word/header1.xml`)
    pub part_name: String,

    /// Reference kind, from the section properties that use the part
    pub kind: SectionPartKind,

    /// Content blocks
    pub blocks: Vec<Block>,

    /// Root element (`w:hdr` / `w:ftr`) with its children stripped
    #[serde(skip)]
    pub(crate) root: XmlElement,
}

impl HeaderFooter {
    /// Create a header or footer part from blocks.
    pub(crate) fn new(part_name: impl Into<String>, root: XmlElement, blocks: Vec<Block>) -> Self {
        Self {
            part_name: part_name.into(),
            kind: SectionPartKind::Default,
            blocks,
            root,
        }
    }

    /// Plain text content.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The zip package behind a document.
///
/// Parts are kept in their original order. The main document, header, footer
/// and core-properties parts are regenerated on save; every other part is
/// written back byte for byte.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub(crate) parts: Vec<Part>,

    /// `w:document` root with an empty `w:body`
    pub(crate) document_root: XmlElement,
}

/// One package part.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
}

impl Package {
    pub(crate) fn new(parts: Vec<Part>, document_root: XmlElement) -> Self {
        Self {
            parts,
            document_root,
        }
    }

    pub(crate) fn blank() -> Self {
        let parts = [
            ("[Content_Types].xml", BLANK_CONTENT_TYPES),
            ("_rels/.rels", BLANK_ROOT_RELS),
            (DOCUMENT_PART, ""),
            ("word/_rels/document.xml.rels", BLANK_DOCUMENT_RELS),
            ("word/styles.xml", BLANK_STYLES),
            (CORE_PART, BLANK_CORE),
        ]
        .into_iter()
        .map(|(name, data)| Part {
            name: name.to_string(),
            data: data.as_bytes().to_vec(),
        })
        .collect();

        let document_root = XmlElement::new("w:document")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:r", R_NS)
            .with_child(XmlElement::new("w:body"));

        Self::new(parts, document_root)
    }

    /// Names of all parts, in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Raw bytes of a part, as loaded.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Check if a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Add or replace a part.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part { name, data }),
        }
    }
}

/// Document metadata from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Document author
    pub creator: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Last author
    pub last_modified_by: Option<String>,

    /// Revision number
    pub revision: Option<u32>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const R_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const BLANK_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const BLANK_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const BLANK_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const BLANK_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style></w:styles>"#;

const BLANK_CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"></cp:coreProperties>"#;

//! DOCX package reader.
//!
//! Loads every part of the zip container, then builds the document model
//! from `word/document.xml`, the header/footer parts referenced by the main
//! document's relationships, `word/styles.xml` and `docProps/core.xml`.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use zip::ZipArchive;

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, Document, HeaderFooter, InlineContent, Length, Metadata, Package,
    Paragraph, ParagraphStyle, Part, Run, SectionPartKind, Table, TableCell, TableRow, TextStyle,
    CORE_PART, DOCUMENT_PART,
};

use super::options::{ErrorMode, ParseOptions};
use super::xml::{self, XmlElement, XmlNode};

const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";
const HEADER_REL: &str = "/header";
const FOOTER_REL: &str = "/footer";
/// Upper bound on the buffer reserved from a part's declared size.
const MAX_PART_PREALLOC: u64 = 1 << 20;

/// DOCX document parser.
pub struct DocxParser {
    parts: Vec<Part>,
    options: ParseOptions,
}

impl DocxParser {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse a DOCX from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a DOCX from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size().min(MAX_PART_PREALLOC) as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        log::debug!("Loaded {} package parts", parts.len());
        Ok(Self { parts, options })
    }

    /// Parse a DOCX from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a DOCX from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse the package and return a structured Document.
    pub fn parse(self) -> Result<Document> {
        let mut root = self.parse_part(DOCUMENT_PART)?;
        if root.local_name() != "document" {
            return Err(Error::Corrupted(
                DOCUMENT_PART.to_string(),
                format!("unexpected root element <{}>", root.name),
            ));
        }

        let references = collect_section_references(&root);

        let body_element = root.child_mut("w:body").ok_or_else(|| {
            Error::Corrupted(DOCUMENT_PART.to_string(), "missing w:body".to_string())
        })?;
        let body = read_blocks(std::mem::take(&mut body_element.children));

        let mut headers = Vec::new();
        let mut footers = Vec::new();
        if self.options.headers_footers {
            for (id, rel_type, target) in self.relationships()? {
                let is_header = rel_type.ends_with(HEADER_REL);
                if !is_header && !rel_type.ends_with(FOOTER_REL) {
                    continue;
                }
                let part_name = resolve_target(&target);
                let Some(mut part) = self.tolerate(self.read_header_footer(&part_name))? else {
                    continue;
                };
                part.kind = references.get(&id).copied().unwrap_or_default();
                if is_header {
                    headers.push(part);
                } else {
                    footers.push(part);
                }
            }
        }

        let style_ids = self.tolerate(self.read_style_ids())?.unwrap_or_default();
        let metadata = self.tolerate(self.read_metadata())?.unwrap_or_default();

        log::debug!(
            "Parsed document: {} body blocks, {} headers, {} footers",
            body.len(),
            headers.len(),
            footers.len()
        );

        Ok(Document {
            metadata,
            body,
            headers,
            footers,
            style_ids,
            package: Package::new(self.parts, root),
        })
    }

    fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    fn parse_part(&self, name: &str) -> Result<XmlElement> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))?;
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::Corrupted(name.to_string(), e.to_string()))?;
        xml::parse(text.trim_start_matches('\u{feff}'))
            .map_err(|e| Error::Corrupted(name.to_string(), e.to_string()))
    }

    /// Apply the error mode to a failure in a secondary part.
    fn tolerate<T>(&self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("Skipping unreadable part: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Relationships of the main document as (id, type, target).
    fn relationships(&self) -> Result<Vec<(String, String, String)>> {
        if self.part(DOCUMENT_RELS_PART).is_none() {
            return Ok(Vec::new());
        }
        let root = self.parse_part(DOCUMENT_RELS_PART)?;
        let mut rels: Vec<_> = root
            .elements()
            .filter(|e| e.local_name() == "Relationship")
            .filter(|e| e.attr("TargetMode") != Some("External"))
            .filter_map(|e| {
                Some((
                    e.attr("Id")?.to_string(),
                    e.attr("Type")?.to_string(),
                    e.attr("Target")?.to_string(),
                ))
            })
            .collect();
        rels.sort_by(|a, b| a.2.cmp(&b.2));
        Ok(rels)
    }

    fn read_header_footer(&self, part_name: &str) -> Result<HeaderFooter> {
        let mut root = self.parse_part(part_name)?;
        if !matches!(root.local_name(), "hdr" | "ftr") {
            return Err(Error::Corrupted(
                part_name.to_string(),
                format!("unexpected root element <{}>", root.name),
            ));
        }
        let blocks = read_blocks(std::mem::take(&mut root.children));
        Ok(HeaderFooter::new(part_name, root, blocks))
    }

    fn read_style_ids(&self) -> Result<std::collections::BTreeSet<String>> {
        if self.part(STYLES_PART).is_none() {
            return Ok(Default::default());
        }
        let root = self.parse_part(STYLES_PART)?;
        Ok(root
            .elements()
            .filter(|e| e.local_name() == "style")
            .filter_map(|e| e.attr("w:styleId"))
            .map(String::from)
            .collect())
    }

    fn read_metadata(&self) -> Result<Metadata> {
        if self.part(CORE_PART).is_none() {
            return Ok(Metadata::default());
        }
        let root = self.parse_part(CORE_PART)?;
        Ok(metadata_from_core(&root))
    }
}

/// Map `Target` attributes (relative to `word/`, or absolute) to part names.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{}", target.trim_start_matches("./")),
    }
}

/// Collect `r:id -> kind` from every header/footer reference in the document.
fn collect_section_references(root: &XmlElement) -> HashMap<String, SectionPartKind> {
    fn walk(element: &XmlElement, out: &mut HashMap<String, SectionPartKind>) {
        for child in element.elements() {
            if matches!(child.local_name(), "headerReference" | "footerReference") {
                if let Some(id) = child.attr("r:id") {
                    let kind = match child.attr("w:type") {
                        Some("first") => SectionPartKind::First,
                        Some("even") => SectionPartKind::Even,
                        _ => SectionPartKind::Default,
                    };
                    out.insert(id.to_string(), kind);
                }
            } else {
                walk(child, out);
            }
        }
    }

    let mut out = HashMap::new();
    walk(root, &mut out);
    out
}

fn metadata_from_core(root: &XmlElement) -> Metadata {
    let mut metadata = Metadata::default();
    for element in root.elements() {
        let value = element.text().trim().to_string();
        if value.is_empty() {
            continue;
        }
        match element.local_name() {
            "title" => metadata.title = Some(value),
            "subject" => metadata.subject = Some(value),
            "creator" => metadata.creator = Some(value),
            "keywords" => metadata.keywords = Some(value),
            "description" => metadata.description = Some(value),
            "lastModifiedBy" => metadata.last_modified_by = Some(value),
            "revision" => metadata.revision = value.parse().ok(),
            "created" => metadata.created = parse_datetime(&value),
            "modified" => metadata.modified = parse_datetime(&value),
            _ => {}
        }
    }
    metadata
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert the children of a block container into blocks.
fn read_blocks(children: Vec<XmlNode>) -> Vec<Block> {
    children
        .into_iter()
        .filter_map(|node| match node {
            XmlNode::Element(e) => Some(read_block(e)),
            XmlNode::Text(_) => None,
        })
        .collect()
}

fn read_block(element: XmlElement) -> Block {
    match element.name.as_str() {
        "w:p" => Block::Paragraph(read_paragraph(element)),
        "w:tbl" if is_modelled_table(&element) => Block::Table(read_table(element)),
        _ => Block::Raw(element),
    }
}

fn read_paragraph(element: XmlElement) -> Paragraph {
    let mut paragraph = Paragraph::new();
    for node in element.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:pPr" => paragraph.style = read_paragraph_style(child),
            "w:r" if is_text_run(&child) => {
                paragraph.content.push(InlineContent::Run(read_run(child)))
            }
            _ => paragraph.content.push(InlineContent::Raw(child)),
        }
    }
    paragraph
}

/// Runs made only of text, plain breaks and tabs are modelled; anything
/// else (fields, drawings, page breaks) stays raw.
fn is_text_run(run: &XmlElement) -> bool {
    run.elements().all(|e| match e.name.as_str() {
        "w:rPr" | "w:t" | "w:tab" | "w:cr" | "w:lastRenderedPageBreak" => true,
        "w:br" => e
            .attributes
            .iter()
            .all(|(k, v)| k == "w:type" && v == "textWrapping"),
        _ => false,
    })
}

fn read_run(element: XmlElement) -> Run {
    let mut run = Run::default();
    for node in element.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:rPr" => run.style = read_text_style(child),
            "w:t" => run.text.push_str(&child.text()),
            "w:br" | "w:cr" => run.text.push('\n'),
            "w:tab" => run.text.push('\t'),
            _ => {}
        }
    }
    run
}

fn on_off(element: &XmlElement) -> bool {
    !matches!(element.attr("w:val"), Some("0" | "false" | "off"))
}

fn read_text_style(rpr: XmlElement) -> TextStyle {
    let mut style = TextStyle::default();
    for node in rpr.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:b" => style.bold = Some(on_off(&child)),
            "w:i" => style.italic = Some(on_off(&child)),
            "w:u" => match child.attr("w:val") {
                Some("none") => style.underline = Some(false),
                Some("single") | None => style.underline = Some(true),
                Some(_) => {
                    style.underline = Some(true);
                    style.extra.push(child);
                }
            },
            "w:sz" => {
                style.font_size = child
                    .attr("w:val")
                    .and_then(|v| v.parse::<f32>().ok())
                    .map(|half_points| half_points / 2.0);
            }
            "w:rFonts" => {
                style.font_name = child
                    .attr("w:ascii")
                    .or_else(|| child.attr("w:hAnsi"))
                    .map(String::from);
                style.extra.push(child);
            }
            "w:color" => {
                style.color = child.attr("w:val").map(String::from);
                style.extra.push(child);
            }
            _ => style.extra.push(child),
        }
    }
    style
}

fn read_paragraph_style(ppr: XmlElement) -> ParagraphStyle {
    let mut style = ParagraphStyle::default();
    for node in ppr.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:pStyle" => style.style_id = child.attr("w:val").map(String::from),
            "w:jc" => match child.attr("w:val").and_then(Alignment::from_jc) {
                Some(alignment) => style.alignment = Some(alignment),
                None => style.extra.push(child),
            },
            "w:ind" => {
                style.left_indent = twips_attr(&child, &["w:left", "w:start"]);
                style.right_indent = twips_attr(&child, &["w:right", "w:end"]);
                style.first_line_indent = twips_attr(&child, &["w:firstLine"])
                    .or_else(|| twips_attr(&child, &["w:hanging"]).map(|h| Length(-h.0)));
                style.extra.push(child);
            }
            "w:spacing" => {
                style.space_before = twips_attr(&child, &["w:before"]);
                if matches!(child.attr("w:lineRule"), None | Some("auto")) {
                    style.line_spacing = child
                        .attr("w:line")
                        .and_then(|v| v.parse::<f32>().ok())
                        .map(|line| line / 240.0);
                }
                style.extra.push(child);
            }
            _ => style.extra.push(child),
        }
    }
    style
}

fn twips_attr(element: &XmlElement, keys: &[&str]) -> Option<Length> {
    keys.iter()
        .find_map(|k| element.attr(k))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| Length(v.round() as i32))
}

/// Tables are modelled only when rows and cells have the plain
/// `tbl > tr > tc` shape; anything wrapped in content controls stays raw.
fn is_modelled_table(table: &XmlElement) -> bool {
    table.elements().all(|child| match child.name.as_str() {
        "w:tblPr" | "w:tblGrid" => true,
        "w:tr" => child
            .elements()
            .all(|c| matches!(c.name.as_str(), "w:tblPrEx" | "w:trPr" | "w:tc")),
        _ => false,
    })
}

fn read_table(element: XmlElement) -> Table {
    let mut table = Table::new();
    for node in element.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:tblPr" => table.properties = Some(child),
            "w:tblGrid" => table.grid = Some(child),
            _ => table.rows.push(read_row(child)),
        }
    }
    table
}

fn read_row(element: XmlElement) -> TableRow {
    let mut row = TableRow::default();
    for node in element.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        if child.name == "w:tc" {
            row.cells.push(read_cell(child));
        } else {
            row.properties.push(child);
        }
    }
    row
}

fn read_cell(mut element: XmlElement) -> TableCell {
    let mut cell = TableCell::default();
    let mut children = std::mem::take(&mut element.children);
    if let Some(pos) = children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(e) if e.name == "w:tcPr"))
    {
        if let XmlNode::Element(props) = children.remove(pos) {
            cell.properties = Some(props);
        }
    }
    cell.blocks = read_blocks(children);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(xml: &str) -> Paragraph {
        read_paragraph(xml::parse(xml).unwrap())
    }

    #[test]
    fn test_read_runs_and_styles() {
        let p = paragraph(
            r#"<w:p><w:pPr><w:jc w:val="center"/><w:ind w:left="1728" w:right="1728"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="44"/><w:rFonts w:ascii="Arial" w:hAnsi="Arial"/></w:rPr><w:t xml:space="preserve">Hola </w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>mundo</w:t><w:br/><w:tab/></w:r></w:p>"#,
        );

        assert_eq!(p.text(), "Hola mundo\n\t");
        assert_eq!(p.style.alignment, Some(Alignment::Center));
        assert_eq!(p.style.left_indent, Some(Length::inches(1.2)));
        assert_eq!(p.content.len(), 3);

        let runs: Vec<_> = p.runs().collect();
        assert_eq!(runs[0].style.bold, Some(true));
        assert_eq!(runs[0].style.font_size, Some(22.0));
        assert_eq!(runs[0].style.font_name.as_deref(), Some("Arial"));
        assert_eq!(runs[1].style.bold, Some(false));
    }

    #[test]
    fn test_field_runs_stay_raw() {
        let p = paragraph(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:br w:type="page"/></w:r><w:r><w:t>x</w:t></w:r></w:p>"#,
        );
        assert_eq!(p.text(), "x");
        assert!(matches!(p.content[0], InlineContent::Raw(_)));
        assert!(matches!(p.content[1], InlineContent::Raw(_)));
    }

    #[test]
    fn test_hanging_indent_and_line_spacing() {
        let p = paragraph(
            r#"<w:p><w:pPr><w:spacing w:before="480" w:line="360" w:lineRule="auto"/><w:ind w:start="720" w:hanging="360"/></w:pPr></w:p>"#,
        );
        assert_eq!(p.style.space_before, Some(Length::pt(24.0)));
        assert_eq!(p.style.line_spacing, Some(1.5));
        assert_eq!(p.style.left_indent, Some(Length(720)));
        assert_eq!(p.style.first_line_indent, Some(Length(-360)));
    }

    #[test]
    fn test_read_table() {
        let block = read_block(
            xml::parse(
                r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/></w:tblPr><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            )
            .unwrap(),
        );
        let Block::Table(table) = block else {
            panic!("expected table");
        };
        assert_eq!(table.style_id(), Some("TableGrid"));
        assert_eq!(table.rows[0].cells[0].plain_text(), "A");
        assert!(table.rows[0].cells[0].properties.is_some());
    }

    #[test]
    fn test_unusual_table_stays_raw() {
        let block = read_block(
            xml::parse(r#"<w:tbl><w:sdt><w:tr/></w:sdt></w:tbl>"#).unwrap(),
        );
        assert!(matches!(block, Block::Raw(_)));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("header1.xml"), "word/header1.xml");
        assert_eq!(resolve_target("/word/footer2.xml"), "word/footer2.xml");
    }

    #[test]
    fn test_metadata_from_core() {
        let root = xml::parse(
            r#"<cp:coreProperties xmlns:cp="x" xmlns:dc="y" xmlns:dcterms="z"><dc:title>Certificado</dc:title><cp:revision>3</cp:revision><dcterms:created>2025-09-16T10:00:00Z</dcterms:created></cp:coreProperties>"#,
        )
        .unwrap();
        let metadata = metadata_from_core(&root);
        assert_eq!(metadata.title.as_deref(), Some("Certificado"));
        assert_eq!(metadata.revision, Some(3));
        assert!(metadata.created.is_some());
    }
}

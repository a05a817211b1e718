//! DOCX package writer.
//!
//! The main document, headers, footers and core properties are serialized
//! from the model; every other part is copied from the loaded package.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{
    Block, Document, HeaderFooter, InlineContent, Length, Metadata, Package, Paragraph,
    ParagraphStyle, Run, Table, TextStyle, CORE_PART, DOCUMENT_PART,
};
use crate::parser::xml::{self, XmlElement, XmlNode};

use super::options::{Compression, SaveOptions};

/// Child order of `w:rPr` (CT_RPr).
const RPR_ORDER: &[&str] = &[
    "w:rStyle", "w:rFonts", "w:b", "w:bCs", "w:i", "w:iCs", "w:caps", "w:smallCaps",
    "w:strike", "w:dstrike", "w:outline", "w:shadow", "w:emboss", "w:imprint", "w:noProof",
    "w:snapToGrid", "w:vanish", "w:webHidden", "w:color", "w:spacing", "w:w", "w:kern",
    "w:position", "w:sz", "w:szCs", "w:highlight", "w:u", "w:effect", "w:bdr", "w:shd",
    "w:fitText", "w:vertAlign", "w:rtl", "w:cs", "w:em", "w:lang", "w:eastAsianLayout",
    "w:specVanish", "w:oMath", "w:rPrChange",
];

/// Child order of `w:pPr` (CT_PPr).
const PPR_ORDER: &[&str] = &[
    "w:pStyle", "w:keepNext", "w:keepLines", "w:pageBreakBefore", "w:framePr",
    "w:widowControl", "w:numPr", "w:suppressLineNumbers", "w:pBdr", "w:shd", "w:tabs",
    "w:suppressAutoHyphens", "w:kinsoku", "w:wordWrap", "w:overflowPunct", "w:topLinePunct",
    "w:autoSpaceDE", "w:autoSpaceDN", "w:bidi", "w:adjustRightInd", "w:snapToGrid",
    "w:spacing", "w:ind", "w:contextualSpacing", "w:mirrorIndents", "w:suppressOverlap",
    "w:jc", "w:textDirection", "w:textAlignment", "w:textboxTightWrap", "w:outlineLvl",
    "w:divId", "w:cnfStyle", "w:rPr", "w:sectPr", "w:pPrChange",
];

/// Serialize a document to `.docx` bytes.
pub fn to_bytes(doc: &Document, options: &SaveOptions) -> Result<Vec<u8>> {
    let blank;
    let package = if doc.package.parts.is_empty() {
        blank = Package::blank();
        &blank
    } else {
        &doc.package
    };

    let mut generated: HashMap<&str, Vec<u8>> = HashMap::new();
    generated.insert(DOCUMENT_PART, write_document(package, &doc.body)?.into_bytes());
    for part in doc.headers.iter().chain(&doc.footers) {
        generated.insert(part.part_name.as_str(), write_header_footer(part)?.into_bytes());
    }

    let mut metadata = doc.metadata.clone();
    if options.touch_modified {
        metadata.modified = Some(Utc::now());
    }
    if let Some(original) = package.part(CORE_PART) {
        if let Some(core) = write_core(original, &metadata) {
            generated.insert(CORE_PART, core.into_bytes());
        }
    }

    let method = match options.compression {
        Compression::Deflated => CompressionMethod::Deflated,
        Compression::Stored => CompressionMethod::Stored,
    };
    let file_options = SimpleFileOptions::default().compression_method(method);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for part in &package.parts {
        let data = generated
            .get(part.name.as_str())
            .map(Vec::as_slice)
            .unwrap_or(part.data.as_slice());
        zip.start_file(part.name.as_str(), file_options)?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;

    log::debug!("Wrote package with {} parts", package.parts.len());
    Ok(cursor.into_inner())
}

fn write_document(package: &Package, body: &[Block]) -> Result<String> {
    let mut root = package.document_root.clone();
    let body_element = root.child_mut("w:body").ok_or_else(|| {
        Error::Corrupted(DOCUMENT_PART.to_string(), "missing w:body".to_string())
    })?;
    body_element.children = write_blocks(body);
    xml::write(&root)
}

fn write_header_footer(part: &HeaderFooter) -> Result<String> {
    let mut root = part.root.clone();
    root.children = write_blocks(&part.blocks);
    xml::write(&root)
}

/// Patch `docProps/core.xml` with the metadata. Returns `None` when the
/// original part cannot be read, in which case it is kept as is.
fn write_core(original: &[u8], metadata: &Metadata) -> Option<String> {
    let parsed = std::str::from_utf8(original)
        .ok()
        .and_then(|text| xml::parse(text.trim_start_matches('\u{feff}')).ok());
    let Some(mut root) = parsed else {
        log::warn!("Keeping unreadable {} unchanged", CORE_PART);
        return None;
    };

    for (prefix, uri) in [
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ] {
        if root.attr(prefix).is_none() {
            root.set_attr(prefix, uri);
        }
    }

    let texts = [
        ("dc:title", metadata.title.clone()),
        ("dc:subject", metadata.subject.clone()),
        ("dc:creator", metadata.creator.clone()),
        ("cp:keywords", metadata.keywords.clone()),
        ("dc:description", metadata.description.clone()),
        ("cp:lastModifiedBy", metadata.last_modified_by.clone()),
        ("cp:revision", metadata.revision.map(|r| r.to_string())),
    ];
    for (name, value) in texts {
        if let Some(value) = value {
            set_core_value(&mut root, name, value, false);
        }
    }
    for (name, value) in [
        ("dcterms:created", metadata.created),
        ("dcterms:modified", metadata.modified),
    ] {
        if let Some(value) = value {
            set_core_value(&mut root, name, format_w3cdtf(value), true);
        }
    }

    xml::write(&root).ok()
}

fn set_core_value(root: &mut XmlElement, name: &str, value: String, dated: bool) {
    if root.child(name).is_none() {
        let mut element = XmlElement::new(name);
        if dated {
            element.set_attr("xsi:type", "dcterms:W3CDTF");
        }
        root.children.push(XmlNode::Element(element));
    }
    if let Some(element) = root.child_mut(name) {
        element.children = vec![XmlNode::Text(value)];
    }
}

fn format_w3cdtf(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serialize blocks as children of a block container.
fn write_blocks(blocks: &[Block]) -> Vec<XmlNode> {
    blocks
        .iter()
        .map(|block| XmlNode::Element(write_block(block)))
        .collect()
}

fn write_block(block: &Block) -> XmlElement {
    match block {
        Block::Paragraph(p) => write_paragraph(p),
        Block::Table(t) => write_table(t),
        Block::Raw(e) => e.clone(),
    }
}

fn write_paragraph(paragraph: &Paragraph) -> XmlElement {
    let mut element = XmlElement::new("w:p");
    if let Some(ppr) = write_paragraph_style(&paragraph.style) {
        element.children.push(XmlNode::Element(ppr));
    }
    for item in &paragraph.content {
        let child = match item {
            InlineContent::Run(run) => write_run(run),
            InlineContent::Raw(raw) => raw.clone(),
        };
        element.children.push(XmlNode::Element(child));
    }
    element
}

fn write_run(run: &Run) -> XmlElement {
    let mut element = XmlElement::new("w:r");
    if let Some(rpr) = write_text_style(&run.style) {
        element.children.push(XmlNode::Element(rpr));
    }

    let mut buffer = String::new();
    for ch in run.text.chars() {
        match ch {
            '\n' | '\t' => {
                flush_text(&mut element, &mut buffer);
                let name = if ch == '\n' { "w:br" } else { "w:tab" };
                element.children.push(XmlNode::Element(XmlElement::new(name)));
            }
            _ => buffer.push(ch),
        }
    }
    flush_text(&mut element, &mut buffer);
    element
}

fn flush_text(run: &mut XmlElement, buffer: &mut String) {
    if buffer.is_empty() {
        return;
    }
    let mut text = XmlElement::new("w:t");
    if buffer.starts_with(char::is_whitespace) || buffer.ends_with(char::is_whitespace) {
        text.set_attr("xml:space", "preserve");
    }
    text.children.push(XmlNode::Text(std::mem::take(buffer)));
    run.children.push(XmlNode::Element(text));
}

fn toggle(name: &str, on: bool) -> XmlElement {
    let element = XmlElement::new(name);
    if on {
        element
    } else {
        element.with_attr("w:val", "0")
    }
}

/// Take a retained property element for patching, or start a new one.
fn retained(extra: &[XmlElement], name: &str) -> XmlElement {
    extra
        .iter()
        .find(|e| e.name == name)
        .cloned()
        .unwrap_or_else(|| XmlElement::new(name))
}

fn write_text_style(style: &TextStyle) -> Option<XmlElement> {
    let managed = ["w:u", "w:rFonts", "w:color"];
    let mut elements: Vec<XmlElement> = style
        .extra
        .iter()
        .filter(|e| !managed.contains(&e.name.as_str()))
        .cloned()
        .collect();

    if let Some(bold) = style.bold {
        elements.push(toggle("w:b", bold));
    }
    if let Some(italic) = style.italic {
        elements.push(toggle("w:i", italic));
    }
    match style.underline {
        Some(true) => {
            let mut u = retained(&style.extra, "w:u");
            if u.attr("w:val").is_none() {
                u.set_attr("w:val", "single");
            }
            elements.push(u);
        }
        Some(false) => elements.push(XmlElement::new("w:u").with_attr("w:val", "none")),
        None => {}
    }

    let mut fonts = retained(&style.extra, "w:rFonts");
    match &style.font_name {
        Some(name) => {
            fonts.set_attr("w:ascii", name.as_str());
            fonts.set_attr("w:hAnsi", name.as_str());
        }
        None => {
            fonts.remove_attr("w:ascii");
            fonts.remove_attr("w:hAnsi");
        }
    }
    if !fonts.attributes.is_empty() {
        elements.push(fonts);
    }

    let mut color = retained(&style.extra, "w:color");
    match &style.color {
        Some(value) => color.set_attr("w:val", value.as_str()),
        None => color.remove_attr("w:val"),
    }
    if !color.attributes.is_empty() {
        elements.push(color);
    }

    if let Some(size) = style.font_size {
        let half_points = (size * 2.0).round() as i64;
        elements.push(XmlElement::new("w:sz").with_attr("w:val", half_points.to_string()));
    }

    properties("w:rPr", elements, RPR_ORDER)
}

fn write_paragraph_style(style: &ParagraphStyle) -> Option<XmlElement> {
    let mut elements: Vec<XmlElement> = style
        .extra
        .iter()
        .filter(|e| e.name != "w:ind" && e.name != "w:spacing")
        .cloned()
        .collect();

    if let Some(id) = &style.style_id {
        elements.push(XmlElement::new("w:pStyle").with_attr("w:val", id.as_str()));
    }
    if let Some(alignment) = style.alignment {
        elements.push(XmlElement::new("w:jc").with_attr("w:val", alignment.as_jc()));
    }

    let mut ind = retained(&style.extra, "w:ind");
    patch_length(&mut ind, ["w:left", "w:start"], ["w:leftChars", "w:startChars"], style.left_indent);
    patch_length(&mut ind, ["w:right", "w:end"], ["w:rightChars", "w:endChars"], style.right_indent);
    match style.first_line_indent {
        Some(Length(value)) if value >= 0 => {
            ind.remove_attr("w:hanging");
            ind.remove_attr("w:hangingChars");
            ind.remove_attr("w:firstLineChars");
            ind.set_attr("w:firstLine", value.to_string());
        }
        Some(Length(value)) => {
            ind.remove_attr("w:firstLine");
            ind.remove_attr("w:firstLineChars");
            ind.remove_attr("w:hangingChars");
            ind.set_attr("w:hanging", (-value).to_string());
        }
        None => {
            ind.remove_attr("w:firstLine");
            ind.remove_attr("w:hanging");
        }
    }
    if !ind.attributes.is_empty() {
        elements.push(ind);
    }

    let mut spacing = retained(&style.extra, "w:spacing");
    match style.space_before {
        Some(before) => {
            spacing.remove_attr("w:beforeAutospacing");
            spacing.remove_attr("w:beforeLines");
            spacing.set_attr("w:before", before.twips().to_string());
        }
        None => spacing.remove_attr("w:before"),
    }
    match style.line_spacing {
        Some(multiple) => {
            let line = (f64::from(multiple) * 240.0).round() as i64;
            spacing.set_attr("w:line", line.to_string());
            spacing.set_attr("w:lineRule", "auto");
        }
        None => {
            if matches!(spacing.attr("w:lineRule"), None | Some("auto")) {
                spacing.remove_attr("w:line");
                spacing.remove_attr("w:lineRule");
            }
        }
    }
    if !spacing.attributes.is_empty() {
        elements.push(spacing);
    }

    properties("w:pPr", elements, PPR_ORDER)
}

fn patch_length(element: &mut XmlElement, keys: [&str; 2], chars: [&str; 2], value: Option<Length>) {
    let key = if element.attr(keys[1]).is_some() {
        keys[1]
    } else {
        keys[0]
    };
    match value {
        Some(length) => {
            for c in chars {
                element.remove_attr(c);
            }
            element.set_attr(key, length.twips().to_string());
        }
        None => {
            for k in keys {
                element.remove_attr(k);
            }
        }
    }
}

/// Build a property container with children in schema order.
fn properties(name: &str, mut elements: Vec<XmlElement>, order: &[&str]) -> Option<XmlElement> {
    if elements.is_empty() {
        return None;
    }
    elements.sort_by_key(|e| {
        order
            .iter()
            .position(|o| *o == e.name)
            .unwrap_or(order.len())
    });
    let mut container = XmlElement::new(name);
    container.children = elements.into_iter().map(XmlNode::Element).collect();
    Some(container)
}

fn write_table(table: &Table) -> XmlElement {
    let mut element = XmlElement::new("w:tbl");
    if let Some(props) = &table.properties {
        element.children.push(XmlNode::Element(props.clone()));
    }
    if let Some(grid) = &table.grid {
        element.children.push(XmlNode::Element(grid.clone()));
    }
    for row in &table.rows {
        let mut tr = XmlElement::new("w:tr");
        for props in &row.properties {
            tr.children.push(XmlNode::Element(props.clone()));
        }
        for cell in &row.cells {
            let mut tc = XmlElement::new("w:tc");
            if let Some(props) = &cell.properties {
                tc.children.push(XmlNode::Element(props.clone()));
            }
            if cell.blocks.is_empty() {
                tc.children.push(XmlNode::Element(XmlElement::new("w:p")));
            } else {
                tc.children.extend(write_blocks(&cell.blocks));
            }
            tr.children.push(XmlNode::Element(tc));
        }
        element.children.push(XmlNode::Element(tr));
    }
    element
}

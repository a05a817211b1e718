//! Shared fixtures: small `.docx` packages built in memory.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builder for a minimal Word package.
pub struct Fixture {
    body: String,
    header: Option<String>,
    footer: Option<String>,
    table_grid: bool,
    extra_parts: Vec<(String, String)>,
}

impl Fixture {
    /// A package whose body holds `body` (raw `w:p` / `w:tbl` markup).
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            header: None,
            footer: None,
            table_grid: true,
            extra_parts: Vec::new(),
        }
    }

    /// A package with one paragraph per text.
    pub fn paragraphs(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| p(t)).collect::<String>())
    }

    pub fn with_header(mut self, content: impl Into<String>) -> Self {
        self.header = Some(content.into());
        self
    }

    pub fn with_footer(mut self, content: impl Into<String>) -> Self {
        self.footer = Some(content.into());
        self
    }

    /// Leave the `TableGrid` style out of `word/styles.xml`.
    pub fn without_table_grid(mut self) -> Self {
        self.table_grid = false;
        self
    }

    /// Add a part the library does not interpret.
    pub fn with_part(mut self, name: impl Into<String>, data: impl Into<String>) -> Self {
        self.extra_parts.push((name.into(), data.into()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut overrides = String::from(
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        );
        let mut rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        let mut section = String::new();
        if self.header.is_some() {
            overrides.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
            rels.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
            section.push_str(r#"<w:headerReference w:type="default" r:id="rId2"/>"#);
        }
        if self.footer.is_some() {
            overrides.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
            rels.push_str(r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
            section.push_str(r#"<w:footerReference w:type="default" r:id="rId3"/>"#);
        }

        let content_types = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
            overrides
        );
        let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;
        let document_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        );
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr>{}<w:pgSz w:w="16838" w:h="11906" w:orient="landscape"/></w:sectPr></w:body></w:document>"#,
            W_NS, R_NS, self.body, section
        );
        let table_grid = if self.table_grid {
            r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/></w:style>"#
        } else {
            ""
        };
        let styles = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>{}</w:styles>"#,
            W_NS, table_grid
        );
        let core = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Certificado</dc:title><dc:creator>Secretaría</dc:creator></cp:coreProperties>"#;

        let mut parts: Vec<(String, String)> = vec![
            ("[Content_Types].xml".into(), content_types),
            ("_rels/.rels".into(), root_rels.into()),
            ("word/document.xml".into(), document),
            ("word/_rels/document.xml.rels".into(), document_rels),
            ("word/styles.xml".into(), styles),
            ("docProps/core.xml".into(), core.into()),
        ];
        if let Some(header) = &self.header {
            parts.push((
                "word/header1.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:hdr xmlns:w="{}" xmlns:r="{}">{}</w:hdr>"#,
                    W_NS, R_NS, header
                ),
            ));
        }
        if let Some(footer) = &self.footer {
            parts.push((
                "word/footer1.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:ftr xmlns:w="{}" xmlns:r="{}">{}</w:ftr>"#,
                    W_NS, R_NS, footer
                ),
            ));
        }
        parts.extend(self.extra_parts.iter().cloned());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A plain run.
pub fn r(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

/// A bold run.
pub fn r_bold(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

/// A run with an explicit font and size.
pub fn r_font(text: &str, font: &str, size_pt: u32) -> String {
    format!(
        r#"<w:r><w:rPr><w:rFonts w:ascii="{f}" w:hAnsi="{f}"/><w:sz w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        size_pt * 2,
        escape(text),
        f = font
    )
}

/// A paragraph with one plain run.
pub fn p(text: &str) -> String {
    p_runs(&[r(text)])
}

/// A paragraph made of the given runs.
pub fn p_runs(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

/// A paragraph with properties and runs.
pub fn p_with(ppr: &str, runs: &[String]) -> String {
    format!("<w:p><w:pPr>{}</w:pPr>{}</w:p>", ppr, runs.concat())
}

/// A single-row table holding one paragraph per cell.
pub fn table(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc><w:tcPr><w:tcW w:w=\"2000\" w:type=\"dxa\"/></w:tcPr>{}</w:tc>", p(c)))
        .collect();
    let grid: String = (0..cells.matches("<w:tc>").count())
        .map(|_| r#"<w:gridCol w:w="2000"/>"#)
        .collect();
    format!(
        r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid>{}</w:tblGrid><w:tr>{}</w:tr></w:tbl>"#,
        grid, cells
    )
}

/// Read a part of a saved package as text.
pub fn read_part(bytes: &[u8], name: &str) -> Option<String> {
    use std::io::Read;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).ok()?;
    Some(text)
}

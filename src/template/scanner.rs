//! Placeholder scanning over flattened paragraph text.

use std::sync::OnceLock;

use regex::Regex;

use super::variables::normalize_name;
use crate::model::{Block, Document, Paragraph};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[\w ]+\}\}").expect("valid regex"))
}

/// A `{{NAME}}` occurrence in a paragraph's flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Byte offset of the opening braces
    pub start: usize,

    /// Byte offset just past the closing braces
    pub end: usize,

    /// Normalized token name
    pub name: String,
}

/// Find the first placeholder starting at or after byte offset `from`.
pub fn find_next(text: &str, from: usize) -> Option<Placeholder> {
    if from > text.len() || !text.is_char_boundary(from) {
        return None;
    }
    placeholder_re().find_at(text, from).map(|m| Placeholder {
        start: m.start(),
        end: m.end(),
        name: normalize_name(&m.as_str()[2..m.as_str().len() - 2]),
    })
}

/// All placeholders in `text`, left to right.
pub fn scan(text: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(placeholder) = find_next(text, from) {
        from = placeholder.end;
        found.push(placeholder);
    }
    found
}

/// Distinct placeholder names in a document, in order of first appearance.
///
/// Covers body paragraphs, table cells, headers and footers.
pub fn scan_document(doc: &Document) -> Vec<String> {
    let mut names = Vec::new();
    collect_blocks(&doc.body, &mut names);
    for part in doc.headers.iter().chain(doc.footers.iter()) {
        collect_blocks(&part.blocks, &mut names);
    }
    names
}

fn collect_blocks(blocks: &[Block], names: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => collect_paragraph(p, names),
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|r| r.cells.iter()) {
                    collect_blocks(&cell.blocks, names);
                }
            }
            Block::Raw(_) => {}
        }
    }
}

fn collect_paragraph(paragraph: &Paragraph, names: &mut Vec<String>) {
    let text = paragraph.text();
    if !text.contains("{{") {
        return;
    }
    for placeholder in scan(&text) {
        if !names.contains(&placeholder.name) {
            names.push(placeholder.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, Table, TableCell, TableRow};

    #[test]
    fn test_find_next() {
        let text = "Certifica a {{ nombres }} por su participación";
        let found = find_next(text, 0).unwrap();
        assert_eq!(found.start, 12);
        assert_eq!(&text[found.start..found.end], "{{ nombres }}");
        assert_eq!(found.name, "NOMBRES");
        assert!(find_next(text, found.end).is_none());
    }

    #[test]
    fn test_accented_names() {
        let found = scan("{{FECHA DE EMISIÓN}} y {{año}}");
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["FECHA DE EMISIÓN", "AÑO"]);
    }

    #[test]
    fn test_rejects_non_word_tokens() {
        let found = scan("{{A-B}} {{}} {NOMBRES} {{ }}x");
        // Only the blank token matches, with an empty name.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "");
        assert!(scan("sin marcadores").is_empty());
    }

    #[test]
    fn test_find_next_off_boundary() {
        assert!(find_next("día {{X}}", 2).is_none());
        assert!(find_next("abc", 10).is_none());
    }

    #[test]
    fn test_scan_document_distinct_names() {
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_text("{{NOMBRES}} - {");
        p.add_run(Run::bold("{curso}}"));
        doc.add_paragraph(p);

        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("{{nombres}} {{HORAS}}")]));
        doc.body.push(Block::Table(table));

        assert_eq!(scan_document(&doc), vec!["NOMBRES", "CURSO", "HORAS"]);
    }
}

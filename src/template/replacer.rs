//! Placeholder replacement over a whole document.

use std::borrow::Cow;

use serde::Serialize;

use super::rich::{self, is_rich_variable};
use super::scanner::find_next;
use super::{FillOptions, VariableMap};
use crate::layout;
use crate::markup::{self, build_table, TableRequest, TABLE_GRID_STYLE};
use crate::model::{Block, Document, Paragraph};

/// Summary of one replacement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    /// Placeholders replaced
    pub replaced: usize,

    /// Distinct token names with no value, in order of first appearance
    pub unresolved: Vec<String>,

    /// Rich values converted to Word content
    pub rich: usize,

    /// Rich values that failed to convert and were inserted as plain text
    pub fallbacks: usize,

    /// Tables created from rich values
    pub tables_inserted: usize,
}

impl ReplaceReport {
    /// Check if every placeholder found a value.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    fn note_unresolved(&mut self, name: &str) {
        if !self.unresolved.iter().any(|n| n == name) {
            self.unresolved.push(name.to_string());
        }
    }
}

/// Fills `{{TOKEN}}` placeholders in a document.
#[derive(Debug, Clone, Default)]
pub struct VariableReplacer {
    options: FillOptions,
}

struct Pass<'a> {
    vars: &'a VariableMap,
    options: &'a FillOptions,
    has_table_grid: bool,
    report: ReplaceReport,
}

impl VariableReplacer {
    /// Create a replacer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a replacer with custom options.
    pub fn with_options(options: FillOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Replace every resolvable placeholder in the body, tables, headers and
    /// footers, then apply the layout rules.
    ///
    /// Never fails: unresolved tokens stay in place and bad rich values fall
    /// back to plain text. Both are counted in the returned report.
    pub fn replace(&self, doc: &mut Document, vars: &VariableMap) -> ReplaceReport {
        let mut pass = Pass {
            vars,
            options: &self.options,
            has_table_grid: doc.has_style(TABLE_GRID_STYLE),
            report: ReplaceReport::default(),
        };

        pass.blocks(&mut doc.body);
        if self.options.headers_footers {
            for part in doc.headers.iter_mut().chain(doc.footers.iter_mut()) {
                pass.blocks(&mut part.blocks);
            }
        }
        let report = pass.report;

        if self.options.apply_layout {
            layout::apply(doc, vars, &self.options.layout_rules, self.options.uppercase_names);
        }

        log::debug!(
            "Replaced {} placeholders ({} rich, {} fallbacks, {} tables, {} unresolved)",
            report.replaced,
            report.rich,
            report.fallbacks,
            report.tables_inserted,
            report.unresolved.len()
        );
        report
    }
}

impl Pass<'_> {
    fn blocks(&mut self, blocks: &mut Vec<Block>) {
        let mut index = 0;
        while index < blocks.len() {
            let requests = match &mut blocks[index] {
                Block::Paragraph(paragraph) => self.paragraph(paragraph),
                Block::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                        self.blocks(&mut cell.blocks);
                    }
                    Vec::new()
                }
                Block::Raw(_) => Vec::new(),
            };

            let tables: Vec<Block> = requests
                .iter()
                .filter_map(|request| build_table(request, self.has_table_grid))
                .map(Block::Table)
                .collect();
            if tables.len() < requests.len() {
                log::debug!("Skipped {} empty tables", requests.len() - tables.len());
            }

            let inserted = tables.len();
            if inserted > 0 {
                log::info!("Inserted {} table(s) after paragraph {}", inserted, index);
                self.report.tables_inserted += inserted;
                blocks.splice(index + 1..index + 1, tables);
            }
            index += 1 + inserted;
        }
    }

    fn paragraph(&mut self, paragraph: &mut Paragraph) -> Vec<TableRequest> {
        let mut tables = Vec::new();
        if !paragraph.runs().any(|r| r.text.contains('{')) {
            return tables;
        }

        let mut from = 0;
        loop {
            let text = paragraph.text();
            let Some(token) = find_next(&text, from) else {
                break;
            };

            let Some(value) = self.vars.resolve_cased(&token.name, self.options.uppercase_names)
            else {
                log::debug!("No value for {{{{{}}}}}, leaving the rest of the paragraph", token.name);
                self.report.note_unresolved(&token.name);
                break;
            };

            let inserted = if is_rich_variable(&token.name) && markup::contains_markup(&value) {
                match rich::insert_rich(
                    paragraph,
                    token.start,
                    token.end,
                    &value,
                    self.options.rich_font_size,
                ) {
                    Ok(insertion) => {
                        self.report.rich += 1;
                        tables.extend(insertion.tables);
                        Some(insertion.len)
                    }
                    Err(e) => {
                        log::warn!(
                            "Rich value for {} could not be converted, inserting as plain text: {}",
                            token.name,
                            e
                        );
                        self.report.fallbacks += 1;
                        rich::insert_plain(paragraph, token.start, token.end, &value)
                    }
                }
            } else if is_rich_variable(&token.name) {
                rich::insert_plain(paragraph, token.start, token.end, &value)
            } else {
                let value = normalize_line_endings(&value);
                paragraph
                    .replace_range(token.start, token.end, &value)
                    .then_some(value.len())
            };

            match inserted {
                Some(len) => {
                    log::debug!("Replaced {{{{{}}}}}", token.name);
                    self.report.replaced += 1;
                    from = token.start + len;
                }
                None => break,
            }
        }
        tables
    }
}

/// `\r\n` and lone `\r` become `\n`, the only line break runs carry.
fn normalize_line_endings(value: &str) -> Cow<'_, str> {
    if value.contains('\r') {
        Cow::Owned(value.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{count_paragraphs, Run, Table, TableCell, TableRow};

    fn replacer() -> VariableReplacer {
        VariableReplacer::with_options(FillOptions::new().without_layout())
    }

    fn doc_with(paragraphs: Vec<Paragraph>) -> Document {
        let mut doc = Document::new();
        for p in paragraphs {
            doc.add_paragraph(p);
        }
        doc
    }

    #[test]
    fn test_replace_keeps_token_run_style() {
        let mut p = Paragraph::new();
        p.add_text("Certifica a ");
        p.add_run(Run::bold("{{NOMBRES}}"));
        p.add_text(" por su participación");
        let mut doc = doc_with(vec![p]);

        let vars = VariableMap::from_pairs([("NOMBRES", "Juan Pérez")]);
        let report = replacer().replace(&mut doc, &vars);

        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.text(), "Certifica a Juan Pérez por su participación");
        let name_run = p.runs().find(|r| r.text == "Juan Pérez").unwrap();
        assert!(name_run.style.is_bold());
        assert_eq!(report.replaced, 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_unresolved_token_stops_paragraph() {
        let mut doc = doc_with(vec![
            Paragraph::with_text("{{A}} {{NOEXISTE}} {{A}}"),
            Paragraph::with_text("{{NOEXISTE}} otra"),
        ]);
        let vars = VariableMap::from_pairs([("A", "x")]);
        let report = replacer().replace(&mut doc, &vars);

        let texts: Vec<_> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["x {{NOEXISTE}} {{A}}", "{{NOEXISTE}} otra"]);
        assert_eq!(report.unresolved, vec!["NOEXISTE"]);
        assert_eq!(report.replaced, 1);
    }

    #[test]
    fn test_value_with_token_syntax_is_not_reexpanded() {
        let mut doc = doc_with(vec![Paragraph::with_text("{{A}}{{B}}")]);
        let vars = VariableMap::from_pairs([("A", "{{B}}"), ("B", "b")]);
        replacer().replace(&mut doc, &vars);
        assert_eq!(doc.paragraphs().next().unwrap().text(), "{{B}}b");
    }

    #[test]
    fn test_uppercase_names_option() {
        let mut doc = doc_with(vec![Paragraph::with_text("{{NOMBRES}} / {{NOMBRE CURSO}}")]);
        let vars = VariableMap::from_pairs([("NOMBRES", "ana"), ("NOMBRE_CURSO", "rust")]);
        let options = FillOptions::new().without_layout().with_uppercase_names(true);
        VariableReplacer::with_options(options).replace(&mut doc, &vars);
        assert_eq!(doc.paragraphs().next().unwrap().text(), "ANA / rust");
    }

    #[test]
    fn test_rich_list_stays_in_paragraph() {
        let mut doc = doc_with(vec![Paragraph::with_text("Lista: {{CONTENIDO}}")]);
        let before = count_paragraphs(&doc.body);
        let vars = VariableMap::from_pairs([("CONTENIDO", "<ol><li>Uno</li><li>Dos</li></ol>")]);
        let report = replacer().replace(&mut doc, &vars);

        assert_eq!(count_paragraphs(&doc.body), before);
        let text = doc.paragraphs().next().unwrap().text();
        assert!(text.contains("1. Uno\n2. Dos"));
        assert_eq!(report.rich, 1);
    }

    #[test]
    fn test_tables_follow_host_paragraph_in_order() {
        let mut doc = doc_with(vec![
            Paragraph::with_text("{{CONTENIDO}}"),
            Paragraph::with_text("después"),
        ]);
        let html = "<table><tr><td>1</td></tr></table><p>texto</p><table><tr><td>2</td><td>3</td></tr></table>";
        let vars = VariableMap::from_pairs([("CONTENIDO", html)]);
        let report = replacer().replace(&mut doc, &vars);

        assert_eq!(report.tables_inserted, 2);
        assert_eq!(doc.body.len(), 4);
        assert_eq!(doc.body[0].plain_text(), "texto");
        assert_eq!(doc.body[1].as_table().unwrap().column_count(), 1);
        assert_eq!(doc.body[2].as_table().unwrap().column_count(), 2);
        assert_eq!(doc.body[3].plain_text(), "después");
        assert_eq!(doc.body[1].as_table().unwrap().style_id(), Some(TABLE_GRID_STYLE));
    }

    #[test]
    fn test_plain_value_for_rich_variable() {
        let mut doc = doc_with(vec![Paragraph::with_text("{{OBJETIVO}}")]);
        let vars = VariableMap::from_pairs([("OBJETIVO", "línea uno\nlínea dos")]);
        let report = replacer().replace(&mut doc, &vars);
        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.text(), "línea uno\nlínea dos");
        assert_eq!(p.runs().filter(|r| r.is_line_break()).count(), 1);
        assert_eq!(report.rich, 0);
    }

    #[test]
    fn test_carriage_returns_become_line_breaks() {
        let mut doc = doc_with(vec![Paragraph::with_text("{{A}} / {{B}} / {{C}}")]);
        let vars = VariableMap::from_pairs([("A", "a\r\nb"), ("B", "c\rd"), ("C", "e")]);
        let report = replacer().replace(&mut doc, &vars);
        let text = doc.paragraphs().next().unwrap().text();
        assert_eq!(text, "a\nb / c\nd / e");
        assert!(!text.contains('\r'));
        assert_eq!(report.replaced, 3);
    }

    #[test]
    fn test_deep_markup_falls_back_to_plain_text() {
        let html = format!("{}x{}", "<span>".repeat(80), "</span>".repeat(80));
        let mut doc = doc_with(vec![Paragraph::with_text("{{CONTENIDO}}")]);
        let vars = VariableMap::from_pairs([("CONTENIDO", html.as_str())]);
        let report = replacer().replace(&mut doc, &vars);
        assert_eq!(report.fallbacks, 1);
        assert_eq!(doc.paragraphs().next().unwrap().text(), html);
    }

    #[test]
    fn test_table_cells_headers_and_footers() {
        let mut doc = Document::new();
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("{{HORAS}} horas")]));
        doc.body.push(Block::Table(table));
        doc.headers.push(crate::model::HeaderFooter::new(
            "word/header1.xml",
            crate::parser::xml::XmlElement::new("w:hdr"),
            vec![Block::Paragraph(Paragraph::with_text("{{HORAS}}"))],
        ));

        let vars = VariableMap::from_pairs([("HORAS", "40")]);
        let report = replacer().replace(&mut doc, &vars);
        assert_eq!(report.replaced, 2);
        assert_eq!(doc.body[0].plain_text(), "40 horas");
        assert_eq!(doc.headers[0].plain_text(), "40");

        let mut doc2 = Document::new();
        doc2.headers.push(crate::model::HeaderFooter::new(
            "word/header1.xml",
            crate::parser::xml::XmlElement::new("w:hdr"),
            vec![Block::Paragraph(Paragraph::with_text("{{HORAS}}"))],
        ));
        let options = FillOptions::new().without_layout().with_headers_footers(false);
        VariableReplacer::with_options(options).replace(&mut doc2, &vars);
        assert_eq!(doc2.headers[0].plain_text(), "{{HORAS}}");
    }
}

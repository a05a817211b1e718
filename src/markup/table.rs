//! Word tables built from table requests.

use super::parse::TableRequest;
use crate::model::{Paragraph, Run, Table, TableCell, TableRow, TextStyle};
use crate::parser::xml::XmlElement;

/// Table style used when the template declares it.
pub const TABLE_GRID_STYLE: &str = "TableGrid";

/// Full width in fiftieths of a percent.
const FULL_WIDTH_PCT: u32 = 5000;

/// Build a bordered, full-width table from a request.
///
/// The table has as many columns as the widest row; short rows are padded
/// with empty cells. `<th>` cells are bold. Returns `None` for a request
/// without rows.
pub fn build_table(request: &TableRequest, has_table_grid: bool) -> Option<Table> {
    let columns = request.column_count();
    if request.rows.is_empty() || columns == 0 {
        return None;
    }

    let mut table = Table::new();
    table.properties = Some(table_properties(has_table_grid));
    table.grid = Some((0..columns).fold(XmlElement::new("w:tblGrid"), |grid, _| {
        grid.with_child(XmlElement::new("w:gridCol"))
    }));

    let cell_width = FULL_WIDTH_PCT / columns as u32;
    for row in &request.rows {
        let mut cells = Vec::with_capacity(columns);
        for index in 0..columns {
            let (text, header) = row
                .get(index)
                .map(|c| (c.text.as_str(), c.header))
                .unwrap_or(("", false));
            cells.push(cell(text, header, cell_width));
        }
        table.add_row(TableRow::new(cells));
    }
    Some(table)
}

fn table_properties(has_table_grid: bool) -> XmlElement {
    let mut props = XmlElement::new("w:tblPr");
    if has_table_grid {
        props = props
            .with_child(XmlElement::new("w:tblStyle").with_attr("w:val", TABLE_GRID_STYLE));
    }
    props = props.with_child(
        XmlElement::new("w:tblW")
            .with_attr("w:w", FULL_WIDTH_PCT.to_string())
            .with_attr("w:type", "pct"),
    );
    if !has_table_grid {
        let borders = ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"]
            .into_iter()
            .fold(XmlElement::new("w:tblBorders"), |borders, side| {
                borders.with_child(
                    XmlElement::new(side)
                        .with_attr("w:val", "single")
                        .with_attr("w:sz", "4")
                        .with_attr("w:space", "0")
                        .with_attr("w:color", "000000"),
                )
            });
        props = props.with_child(borders);
    }
    props.with_child(XmlElement::new("w:tblLayout").with_attr("w:type", "autofit"))
}

fn cell(text: &str, header: bool, width: u32) -> TableCell {
    let mut paragraph = Paragraph::new();
    paragraph
        .style
        .extra
        .push(XmlElement::new("w:suppressAutoHyphens").with_attr("w:val", "1"));
    if !text.is_empty() {
        let style = TextStyle {
            bold: header.then_some(true),
            ..Default::default()
        };
        paragraph.add_run(Run::styled(text, style));
    }

    let mut cell = TableCell::with_paragraph(paragraph);
    cell.properties = Some(
        XmlElement::new("w:tcPr").with_child(
            XmlElement::new("w:tcW")
                .with_attr("w:w", width.to_string())
                .with_attr("w:type", "pct"),
        ),
    );
    cell
}

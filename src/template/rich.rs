//! Insertion of multi-line and rich values at a placeholder position.

use crate::error::{Error, Result};
use crate::markup::{self, EmitOptions, TableRequest};
use crate::model::{Alignment, Paragraph, Run, TextStyle};

/// Variables whose values may carry rich-text markup.
pub const RICH_VARIABLES: [&str; 6] = [
    "OBJETIVO DEL PROGRAMA",
    "OBJETIVO_PROGRAMA",
    "OBJETIVO",
    "CONTENIDO",
    "CONTENIDO_PROGRAMA",
    "CONTENIDO DEL PROGRAMA",
];

/// Check if a normalized token name may receive rich content.
pub fn is_rich_variable(name: &str) -> bool {
    RICH_VARIABLES.contains(&name)
}

/// Outcome of a rich insertion.
#[derive(Debug, Clone, Default)]
pub struct RichInsertion {
    /// Bytes of text inserted at the placeholder position
    pub len: usize,

    /// Tables to place after the host paragraph
    pub tables: Vec<TableRequest>,
}

/// Replace `[start, end)` with `value` split into lines.
///
/// Every non-blank line becomes one run with the formatting of the run that
/// held the placeholder; consecutive lines are separated by a line-break run.
/// Returns the number of bytes inserted, or `None` if the range was invalid.
pub fn insert_plain(paragraph: &mut Paragraph, start: usize, end: usize, value: &str) -> Option<usize> {
    let host = paragraph.style_at(start).cloned().unwrap_or_default();
    if !paragraph.delete_range(start, end) {
        return None;
    }

    let runs = plain_runs(value, &host);
    let len = runs.iter().map(|r| r.text.len()).sum();
    let index = paragraph.split_at(start);
    paragraph.insert_runs(index, runs);
    Some(len)
}

fn plain_runs(value: &str, host: &TextStyle) -> Vec<Run> {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    let mut runs = Vec::new();
    for (index, line) in normalized.split('\n').enumerate() {
        if index > 0 {
            runs.push(Run::styled("\n", host.clone()));
        }
        let line = line.trim();
        if !line.is_empty() {
            runs.push(Run::styled(line, host.clone()));
        }
    }
    runs
}

/// Replace `[start, end)` with the runs produced from an HTML value.
///
/// The paragraph is only touched once the markup has been parsed, so an
/// `Err` leaves it unchanged. The host paragraph takes the alignment and
/// line spacing requested by the markup (left aligned by default).
pub fn insert_rich(
    paragraph: &mut Paragraph,
    start: usize,
    end: usize,
    html: &str,
    font_size: f32,
) -> Result<RichInsertion> {
    let block = markup::parse(html)?;

    let text = paragraph.text();
    let before = text.get(..start).ok_or_else(|| {
        Error::Markup(format!("placeholder offset {} outside paragraph", start))
    })?;
    let current_line = before.rsplit('\n').next().unwrap_or("");
    let options = EmitOptions {
        font_size,
        host_line_blank: current_line.trim().is_empty(),
    };
    let mut emitted = markup::emit(&block, &options);

    // Host text after a closing block goes on its own line, without the
    // spaces that separated it from the placeholder.
    let tail = text.get(end..).unwrap_or("");
    let rest = tail.trim_start_matches(' ');
    let break_before_tail =
        emitted.ends_with_block && !rest.trim().is_empty() && !rest.starts_with('\n');
    let delete_end = if break_before_tail {
        end + (tail.len() - rest.len())
    } else {
        end
    };

    if !paragraph.delete_range(start, delete_end) {
        return Err(Error::Markup(format!(
            "placeholder range {}..{} outside paragraph",
            start, end
        )));
    }
    if break_before_tail {
        emitted.runs.push(Run::line_break());
    }
    let len = emitted.runs.iter().map(|r| r.text.len()).sum();
    let index = paragraph.split_at(start);
    paragraph.insert_runs(index, emitted.runs);

    paragraph.style.alignment = Some(emitted.alignment.unwrap_or(Alignment::Left));
    if let Some(spacing) = emitted.line_spacing {
        paragraph.style.line_spacing = Some(spacing);
    }

    Ok(RichInsertion {
        len,
        tables: emitted.tables,
    })
}

//! Plain-text table rendering for parsed records.
//!
//! Records may have different field counts, so the table is as wide as
//! the widest record and short rows are left blank on the right. The first
//! column always holds the source line number.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::fields::FieldSet;

pub fn render_records(headers: Option<&FieldSet>, records: &[FieldSet]) -> String {
    let field_count = headers
        .into_iter()
        .chain(records)
        .map(FieldSet::len)
        .max()
        .unwrap_or(0);

    let mut header_row = vec!["line".to_string()];
    header_row.extend((0..field_count).map(|idx| {
        headers
            .and_then(|h| h.get(idx))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("field_{}", idx + 1))
    }));

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![record.line_number().to_string()];
            row.extend(record.iter().map(|cell| sanitize_cell(cell).into_owned()));
            row
        })
        .collect::<Vec<_>>();

    let mut widths = header_row.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&header_row, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(padding));
    }
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

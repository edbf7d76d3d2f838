//! Comma-separated sheet export parser.
//!
//! Deliberately simple: the first line is the header, later lines are split on
//! commas outside double quotes, and each cell loses at most one leading and one
//! trailing quote. Doubled quotes (`""`) inside a cell are not unescaped.
//! Malformed rows never fail the parse; cells are aligned positionally.

use serde::Serialize;

use crate::data::record::Record;

/// Parsed export: header names in column order plus one record per data line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

pub fn parse(text: &str) -> ParsedTable {
    // Sheet exports saved from spreadsheet tools may start with a UTF-8 BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return ParsedTable::default();
    }

    let mut lines = text.split('\n').map(str::trim);
    let headers: Vec<String> = lines
        .next()
        .unwrap_or_default()
        .split(',')
        .map(|cell| strip_quotes(cell.trim()).to_string())
        .collect();

    let rows = lines
        .map(|line| row_to_record(&headers, &split_quoted_line(line)))
        .collect();

    ParsedTable { headers, rows }
}

/// Split on commas that have an even number of `"` after them on the line,
/// i.e. commas that sit outside any quoted cell.
fn split_quoted_line(line: &str) -> Vec<&str> {
    let total_quotes = line.matches('"').count();
    let mut seen_quotes = 0usize;
    let mut cells = Vec::new();
    let mut start = 0usize;

    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => seen_quotes += 1,
            ',' if (total_quotes - seen_quotes) % 2 == 0 => {
                cells.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    cells.push(&line[start..]);
    cells
}

fn strip_quotes(cell: &str) -> &str {
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    cell.strip_suffix('"').unwrap_or(cell)
}

fn row_to_record(headers: &[String], values: &[&str]) -> Record {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let value = values
                .get(idx)
                .map(|v| strip_quotes(v.trim()))
                .unwrap_or("");
            (header.clone(), value.to_string())
        })
        .collect()
}

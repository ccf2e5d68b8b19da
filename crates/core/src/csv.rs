//! CSV export and import of candidate records.
//!
//! Export writes one header row of field keys followed by one row per
//! record. Import splits the document into rows and hands them to
//! [`bind_table`].

use crate::candidate::{Candidate, CandidateInput, Field};
use crate::table::{bind_table, ImportError};

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Build a CSV document with every exported field of `records`.
pub fn build_csv<'a>(records: impl IntoIterator<Item = &'a Candidate>) -> String {
    let mut lines = Vec::new();

    let header: Vec<_> = Field::ALL.iter().map(|f| csv_escape(f.key())).collect();
    lines.push(header.join(","));

    for record in records {
        let row: Vec<_> = Field::ALL
            .iter()
            .map(|&field| {
                let value = record.text(field);
                if field.is_amount() || field == Field::Order {
                    value
                } else {
                    csv_escape(&neutralize_formula(&value))
                }
            })
            .collect();
        lines.push(row.join(","));
    }

    let mut document = lines.join("\r\n");
    document.push_str("\r\n");
    document
}

/// Quote a cell when it contains a delimiter, quote, or line break.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Prefix text cells that a spreadsheet would evaluate as a formula.
fn neutralize_formula(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

/// Undo [`neutralize_formula`] on import.
fn restore_formula(value: &str) -> &str {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some('\''), Some('=' | '+' | '-' | '@')) => &value[1..],
        _ => value,
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Parse raw CSV bytes into partial records ready for import.
///
/// Formula-neutralising quotes added by [`build_csv`] are removed before
/// binding.
pub fn parse_csv(data: &[u8]) -> Result<Vec<CandidateInput>, ImportError> {
    let text = std::str::from_utf8(data).map_err(|e| ImportError::InvalidUtf8(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let rows = split_rows(text).into_iter().map(|row| {
        row.into_iter()
            .map(|cell| restore_formula(&cell).to_string())
            .collect()
    });
    bind_table(rows)
}

/// Split a CSV document into rows of cells.
///
/// Handles quoted cells, doubled quotes, and line breaks inside quotes.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut current));
                rows.push(std::mem::take(&mut row));
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() || !row.is_empty() {
        row.push(current);
        rows.push(row);
    }
    rows
}

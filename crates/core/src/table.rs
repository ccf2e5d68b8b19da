//! Binding of uploaded tables (CSV text or a workbook's first sheet) onto
//! partial records.
//!
//! The first row is the header. Recognised column names (field keys,
//! case-insensitive, or Arabic labels) are mapped onto the record shape;
//! unrecognised and derived columns are ignored.

use crate::candidate::{CandidateInput, Field};

/// Errors produced while reading an uploaded table.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("Document is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Workbook could not be read: {0}")]
    Workbook(String),

    #[error("Workbook has no worksheet")]
    NoWorksheet,

    #[error("Document is empty")]
    Empty,

    #[error("Header row has no recognised columns")]
    NoRecognisedColumns,

    /// `row` counts table rows with the header as row 1.
    #[error("Row {row}: column '{column}' expects a number, got '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Bind `rows`, whose first entry is the header, into partial records.
///
/// Rows whose cells are all blank are skipped; cells past the end of a
/// short row are left unset.
pub fn bind_table(
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<Vec<CandidateInput>, ImportError> {
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(ImportError::Empty)?;

    let columns: Vec<Option<Field>> = header
        .iter()
        .map(|h| Field::from_header(h).filter(|f| !f.is_derived()))
        .collect();
    if columns.iter().all(Option::is_none) {
        return Err(ImportError::NoRecognisedColumns);
    }

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut input = CandidateInput::default();
        for (field, cell) in columns.iter().zip(row.iter()) {
            let Some(field) = *field else { continue };
            input
                .set_text(field, cell)
                .map_err(|value| ImportError::InvalidNumber {
                    row: index + 2,
                    column: field.key(),
                    value,
                })?;
        }
        records.push(input);
    }

    Ok(records)
}

//! Binding between candidate records and spreadsheet value ranges.
//!
//! Reads bind columns by header name. Writes use one of two fixed layouts,
//! with a header row so the sheet stays readable by name:
//! [`STORE_COLUMNS`] when the sheet is the record store, and the shorter
//! [`APPEND_COLUMNS`] for single rows appended to a hand-kept sheet.

use serde_json::Value;

use crate::candidate::{format_flag, Candidate, CandidateInput, Field};
use crate::types::CandidateId;

/// Layout of a sheet that stores the whole collection. Carries `id` so
/// records keep their identity across reloads.
pub const STORE_COLUMNS: [Field; 23] = Field::ALL;

/// Layout of rows appended one at a time.
pub const APPEND_COLUMNS: [Field; 21] = [
    Field::Order,
    Field::Name,
    Field::BirthDate,
    Field::BirthCountry,
    Field::BirthPlace,
    Field::Address,
    Field::PassportProfession,
    Field::ProjectProfession,
    Field::PassportNumber,
    Field::IssueDate,
    Field::ExpiryDate,
    Field::IssuingAuthority,
    Field::IdNumber,
    Field::IsReserve,
    Field::Agent,
    Field::Representative,
    Field::PhoneNumber,
    Field::FirstPayment,
    Field::SecondPayment,
    Field::ThirdPayment,
    Field::TotalPayments,
];

/// Columns a sheet must carry for its rows to be read.
const REQUIRED_COLUMNS: [Field; 4] = [
    Field::Name,
    Field::FirstPayment,
    Field::SecondPayment,
    Field::ThirdPayment,
];

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SheetError {
    #[error("Sheet is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Sheet has column '{0}' more than once")]
    DuplicateColumn(&'static str),

    #[error("Row {row} has {cells} cells but the header has {width}")]
    RowTooWide { row: usize, cells: usize, width: usize },

    #[error("Row {row}: column '{column}' expects a number, got '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A data row read back from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRow {
    /// Non-blank text of the `id` column, when the sheet has one.
    pub id: Option<CandidateId>,
    pub input: CandidateInput,
}

/// Header row for `columns`.
pub fn header_row(columns: &[Field]) -> Vec<Value> {
    columns
        .iter()
        .map(|f| Value::String(f.key().to_string()))
        .collect()
}

/// One sheet row for `candidate` in `columns` order.
///
/// Amounts and the rank are written as numbers, the reserve flag as
/// `TRUE`/`FALSE`, everything else as text.
pub fn to_row(candidate: &Candidate, columns: &[Field]) -> Vec<Value> {
    columns
        .iter()
        .map(|&field| match field {
            Field::Order => Value::from(candidate.order),
            Field::IsReserve => Value::String(format_flag(candidate.is_reserve).to_string()),
            Field::FirstPayment => number(candidate.first_payment),
            Field::SecondPayment => number(candidate.second_payment),
            Field::ThirdPayment => number(candidate.third_payment),
            Field::TotalPayments => number(candidate.total_payments),
            other => Value::String(candidate.text(other)),
        })
        .collect()
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Bind a value range whose first row is the header.
///
/// Rows that are entirely blank are skipped. Cells past the end of a short
/// row read as blank, since the sheets API trims trailing empty cells.
pub fn bind_rows(values: &[Vec<Value>]) -> Result<Vec<BoundRow>, SheetError> {
    let Some((header, rows)) = values.split_first() else {
        return Ok(Vec::new());
    };

    let columns = bind_header(header)?;
    let width = header.len();

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        // Header is sheet row 1.
        let sheet_row = index + 2;
        let cells: Vec<String> = row.iter().map(cell_text).collect();

        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if cells.len() > width {
            return Err(SheetError::RowTooWide {
                row: sheet_row,
                cells: cells.len(),
                width,
            });
        }

        let mut id = None;
        let mut input = CandidateInput::default();
        for (field, cell) in columns.iter().zip(cells.iter()) {
            let Some(field) = *field else { continue };
            if field == Field::Id {
                let trimmed = cell.trim();
                id = (!trimmed.is_empty()).then(|| trimmed.to_string());
                continue;
            }
            input
                .set_text(field, cell)
                .map_err(|value| SheetError::InvalidNumber {
                    row: sheet_row,
                    column: field.key(),
                    value,
                })?;
        }
        fill_missing_amounts(&mut input);
        records.push(BoundRow { id, input });
    }

    Ok(records)
}

fn bind_header(header: &[Value]) -> Result<Vec<Option<Field>>, SheetError> {
    let mut columns: Vec<Option<Field>> = Vec::with_capacity(header.len());
    for cell in header {
        let field = Field::from_header(&cell_text(cell));
        if let Some(field) = field {
            if columns.contains(&Some(field)) {
                return Err(SheetError::DuplicateColumn(field.key()));
            }
        }
        columns.push(field);
    }

    for required in REQUIRED_COLUMNS {
        if !columns.contains(&Some(required)) {
            return Err(SheetError::MissingColumn(required.key()));
        }
    }
    Ok(columns)
}

/// A short row leaves trailing amount columns unset; read them as zero.
fn fill_missing_amounts(input: &mut CandidateInput) {
    input.first_payment.get_or_insert(0.0);
    input.second_payment.get_or_insert(0.0);
    input.third_payment.get_or_insert(0.0);
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => format_flag(*b).to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

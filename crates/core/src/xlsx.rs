//! Excel workbook export and import.
//!
//! Export writes a single `Candidates` sheet with the same columns as the
//! CSV export. Import reads the first worksheet of an `.xlsx` or `.xls`
//! workbook and binds it like a CSV document.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::candidate::{format_amount, format_flag, Candidate, CandidateInput, Field};
use crate::table::{bind_table, ImportError};

/// Name of the exported worksheet.
pub const EXPORT_SHEET_NAME: &str = "Candidates";

#[derive(Debug, thiserror::Error)]
#[error("Workbook could not be written: {0}")]
pub struct XlsxExportError(#[from] XlsxError);

/// Build an `.xlsx` workbook with every exported field of `records`.
pub fn build_xlsx<'a>(
    records: impl IntoIterator<Item = &'a Candidate>,
) -> Result<Vec<u8>, XlsxExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, field) in (0u16..).zip(Field::ALL) {
        sheet.write_string(0, col, field.key())?;
    }

    for (row, record) in (1u32..).zip(records) {
        for (col, field) in (0u16..).zip(Field::ALL) {
            match field {
                Field::Order => sheet.write_number(row, col, f64::from(record.order))?,
                Field::IsReserve => sheet.write_boolean(row, col, record.is_reserve)?,
                f if f.is_amount() => {
                    sheet.write_number(row, col, amount_of(record, f))?
                }
                f => sheet.write_string(row, col, record.text(f))?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn amount_of(record: &Candidate, field: Field) -> f64 {
    match field {
        Field::FirstPayment => record.first_payment,
        Field::SecondPayment => record.second_payment,
        Field::ThirdPayment => record.third_payment,
        _ => record.total_payments,
    }
}

/// Parse an uploaded workbook into partial records ready for import.
pub fn parse_xlsx(data: &[u8]) -> Result<Vec<CandidateInput>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)?
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    bind_table(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_amount(*f),
        Data::Bool(b) => format_flag(*b).to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(when) => when.date().format("%Y-%m-%d").to_string(),
            None => format_amount(dt.as_f64()),
        },
        other => other.to_string(),
    }
}

use crate::config::toml_config::ExpenseConfig;
use crate::core::aggregate::parse_amount;
use crate::domain::model::{DateRange, NormalizedTable, Total};
use crate::utils::error::{Result, TollError};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use std::io::Cursor;
use umya_spreadsheet::Spreadsheet;

const CURRENCY_FORMAT: &str = "\"$\"#,##0.00";

/// Column letters for a 1-based column number (1 → A, 27 → AA).
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Excel serial day number (1900 date system).
pub fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Writes the table into a new single-sheet workbook with a `SUM` row under the amount column.
pub fn build_tolls_workbook(
    table: &NormalizedTable,
    amount_header: &str,
    sheet_name: &str,
) -> Result<Spreadsheet> {
    let amount_idx = table.column_index(amount_header)?;
    let amount_col = amount_idx as u32 + 1;

    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| TollError::Spreadsheet {
            message: "new workbook has no sheet".to_string(),
        })?;
    sheet.set_name(sheet_name);

    for (col, label) in table.header().iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1))
            .set_value_string(label.as_str());
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = idx as u32 + 2;
        for (col, value) in row.iter().enumerate() {
            let cell = sheet.get_cell_mut((col as u32 + 1, row_num));
            if col == amount_idx {
                let amount = parse_amount(value).ok_or_else(|| TollError::InvalidAmount {
                    row: idx + 1,
                    value: value.clone(),
                })?;
                cell.set_value_number(amount.to_f64().unwrap_or_default());
                cell.get_style_mut()
                    .get_number_format_mut()
                    .set_format_code(CURRENCY_FORMAT);
            } else {
                cell.set_value_string(value.as_str());
            }
        }
    }

    let last_row = table.len() as u32 + 1;
    let letter = column_letter(amount_col);
    let formula = format!("SUM({letter}1:{letter}{last_row})");
    let total_cell = sheet.get_cell_mut((amount_col, last_row + 1));
    total_cell.set_formula(formula.as_str());
    total_cell
        .get_style_mut()
        .get_number_format_mut()
        .set_format_code(CURRENCY_FORMAT);

    tracing::debug!(
        "Built tolls sheet '{}' with {} rows, total formula {}",
        sheet_name,
        table.len(),
        formula
    );
    Ok(book)
}

/// Overwrites the start-date and total cells on the report's first sheet.
pub fn patch_expense_report(
    mut report: Spreadsheet,
    range: &DateRange,
    total: &Total,
    config: &ExpenseConfig,
) -> Result<Spreadsheet> {
    let sheet = report
        .get_sheet_mut(&0)
        .ok_or_else(|| TollError::Spreadsheet {
            message: "expense report has no worksheets".to_string(),
        })?;

    let date_cell = sheet.get_cell_mut(config.start_date_cell.as_str());
    date_cell.set_value_number(excel_serial(range.start()));
    date_cell
        .get_style_mut()
        .get_number_format_mut()
        .set_format_code(config.date_format.as_str());

    sheet
        .get_cell_mut(config.total_cell.as_str())
        .set_value_number(total.as_f64());

    tracing::debug!(
        "Patched expense report: {}={}, {}={}",
        config.start_date_cell,
        range.start(),
        config.total_cell,
        total
    );
    Ok(report)
}

pub fn read_workbook(bytes: &[u8]) -> Result<Spreadsheet> {
    Ok(umya_spreadsheet::reader::xlsx::read_reader(
        Cursor::new(bytes),
        true,
    )?)
}

pub fn write_workbook(book: &Spreadsheet) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)?;
    Ok(cursor.into_inner())
}

//! Workbook store: reads every worksheet through `calamine` and rewrites
//! the file through `rust_xlsxwriter`, appending the write set to the
//! target sheet. Sheet order and names are preserved; the date column is
//! serialized numerically (number format `0`), matching the artifact's
//! native convention.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::{
    batch::{Cell, SheetData},
    dates,
    errors::AppendError,
};

#[derive(Debug)]
pub struct WorkbookData {
    pub sheets: Vec<SheetData>,
    /// Index into `sheets` of the sheet appends go to.
    pub target: usize,
}

impl WorkbookData {
    pub fn target_sheet(&self) -> &SheetData {
        &self.sheets[self.target]
    }
}

/// Reads all worksheets, resolving `sheet` against the workbook's sheet
/// names (first sheet when `None`). Cells are captured by absolute
/// physical position so row indices line up with what the operator sees.
pub fn load(path: &Path, sheet: Option<&str>) -> Result<WorkbookData> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let names = workbook.sheet_names().to_owned();
    let target = match sheet {
        Some(wanted) => names
            .iter()
            .position(|name| name == wanted)
            .ok_or_else(|| AppendError::SheetNotFound(wanted.to_string()))?,
        None => 0,
    };

    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("Reading worksheet '{name}'"))?;
        let mut rows = Vec::new();
        if let Some(end) = range.end() {
            for row_idx in 0..=end.0 {
                let mut row = Vec::with_capacity(end.1 as usize + 1);
                for col_idx in 0..=end.1 {
                    let cell = match range.get_value((row_idx, col_idx)) {
                        Some(data) => cell_from_data(data),
                        None => Cell::Empty,
                    };
                    row.push(cell);
                }
                rows.push(row);
            }
        }
        sheets.push(SheetData {
            name: name.clone(),
            rows,
        });
    }

    if sheets[target].rows.is_empty() {
        return Err(AppendError::MissingHeaderRow.into());
    }
    Ok(WorkbookData { sheets, target })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Rewrites the workbook with `write_set` appended to the target sheet
/// starting at `insertion_row` (1-based). Columns map positionally per
/// the persisted header order. `persisted_date_idx` marks the existing
/// date column, `incoming_date_idx` the date field within each appended
/// record; both are serialized as Excel serial numbers. The two indices
/// can differ when the headers mismatched.
pub fn save(
    path: &Path,
    data: &WorkbookData,
    write_set: &[Vec<String>],
    insertion_row: u32,
    persisted_date_idx: usize,
    incoming_date_idx: usize,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let serial_format = Format::new().set_num_format("0");

    for (sheet_idx, sheet) in data.sheets.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .with_context(|| format!("Naming worksheet '{}'", sheet.name))?;

        let is_target = sheet_idx == data.target;
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let date_cell = is_target && row_idx > 0 && col_idx == persisted_date_idx;
                write_cell(worksheet, row_idx as u32, col_idx as u16, cell, date_cell, &serial_format)
                    .with_context(|| {
                        format!("Writing row {} of '{}'", row_idx + 1, sheet.name)
                    })?;
            }
        }

        if is_target {
            for (offset, record) in write_set.iter().enumerate() {
                let row_idx = insertion_row - 1 + offset as u32;
                write_record(worksheet, row_idx, record, incoming_date_idx, &serial_format)
                    .with_context(|| format!("Appending row {}", row_idx + 1))?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Saving workbook {path:?}"))?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    date_cell: bool,
    serial_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Number(f) if date_cell => {
            worksheet.write_number_with_format(row, col, *f, serial_format)?;
        }
        Cell::Number(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

fn write_record(
    worksheet: &mut Worksheet,
    row: u32,
    record: &[String],
    date_idx: usize,
    serial_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col_idx, field) in record.iter().enumerate() {
        let col = col_idx as u16;
        if col_idx == date_idx {
            // The filter guarantees a parseable date here; fall back to the
            // raw text if the guarantee is ever broken.
            match dates::parse_flexible_date(field) {
                Some(date) => {
                    let serial = dates::serial_from_date(date) as f64;
                    worksheet.write_number_with_format(row, col, serial, serial_format)?;
                }
                None => {
                    worksheet.write_string(row, col, field)?;
                }
            }
        } else if field.is_empty() {
            continue;
        } else if let Ok(number) = field.parse::<f64>() {
            worksheet.write_number(row, col, number)?;
        } else {
            worksheet.write_string(row, col, field)?;
        }
    }
    Ok(())
}

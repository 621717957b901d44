//! The append pipeline's pure core: header reconciliation, the
//! duplicate-date filter, the insertion-point scan, and the run summary.
//!
//! Everything here operates on in-memory batches so the whole pipeline
//! can be exercised without touching a workbook on disk.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{batch::SheetData, dates};

/// Normalized form used for header equality checks only; raw names are
/// what gets stored and reported.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStatus {
    Matched,
    Mismatched,
}

impl HeaderStatus {
    pub fn is_matched(self) -> bool {
        self == HeaderStatus::Matched
    }
}

/// Element-wise comparison of the two header rows after trimming and
/// lowercasing. Any difference in length, order, or content is a
/// mismatch; a mismatch is a warning for the operator, never an error.
pub fn reconcile_headers(incoming: &[String], persisted: &[String]) -> HeaderStatus {
    if incoming.len() == persisted.len()
        && incoming
            .iter()
            .zip(persisted.iter())
            .all(|(left, right)| normalize_header(left) == normalize_header(right))
    {
        HeaderStatus::Matched
    } else {
        HeaderStatus::Mismatched
    }
}

pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    headers
        .iter()
        .position(|header| normalize_header(header) == wanted)
}

/// Collects every canonical date already present in the persisted sheet.
/// Cells with no parseable date contribute nothing to the set.
pub fn existing_dates(sheet: &SheetData, date_idx: usize) -> BTreeSet<NaiveDate> {
    sheet
        .data_rows()
        .iter()
        .filter_map(|row| row.get(date_idx))
        .filter_map(dates::date_from_cell)
        .collect()
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Surviving rows in their original relative order.
    pub write_set: Vec<Vec<String>>,
    /// Distinct duplicate dates, sorted ascending.
    pub skipped_dates: Vec<NaiveDate>,
    /// Rows excluded because their date field would not parse.
    pub skipped_invalid: usize,
}

/// Stable filter over the incoming rows: rows whose date is already
/// persisted are dropped (one report entry per distinct date), rows with
/// an unparseable date are dropped and counted separately, and everything
/// else survives in order. Incoming rows are never deduplicated against
/// each other.
pub fn filter_new_rows(
    rows: Vec<Vec<String>>,
    date_idx: usize,
    existing: &BTreeSet<NaiveDate>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let mut skipped = BTreeSet::new();
    for row in rows {
        let raw = row.get(date_idx).map(String::as_str).unwrap_or("");
        match dates::parse_flexible_date(raw) {
            None => outcome.skipped_invalid += 1,
            Some(date) if existing.contains(&date) => {
                skipped.insert(date);
            }
            Some(_) => outcome.write_set.push(row),
        }
    }
    outcome.skipped_dates = skipped.into_iter().collect();
    outcome
}

/// First physical row to write to: one past the last row whose first
/// column is non-blank, scanning upward from the bottom. Stray blank rows
/// left behind by manual edits are walked over instead of extending the
/// sheet past them. A sheet with no occupied data rows yields row 2.
pub fn insertion_row(sheet: &SheetData) -> u32 {
    for idx in (1..sheet.rows.len()).rev() {
        if let Some(cell) = sheet.rows[idx].first() {
            if !cell.is_blank() {
                return (idx + 2) as u32;
            }
        }
    }
    2
}

/// Everything a run reports: to the console, the bilingual log entry,
/// and `--json` output.
#[derive(Debug, Serialize)]
pub struct AppendSummary {
    pub added_rows: usize,
    pub skipped_dates: Vec<NaiveDate>,
    pub skipped_invalid: usize,
    pub header_status: HeaderStatus,
    pub incoming_headers: Vec<String>,
    pub persisted_headers: Vec<String>,
    pub insertion_row: u32,
    pub elapsed_secs: f64,
}

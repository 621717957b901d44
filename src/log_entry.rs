//! Bilingual (English/German) log entries, appended once per successful
//! run to an operator-facing text log.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::engine::{AppendSummary, HeaderStatus};

pub const DEFAULT_LOG_FILE: &str = "import_log.txt";

/// The log lives beside the workbook unless overridden.
pub fn default_log_path(workbook: &Path) -> PathBuf {
    workbook
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_LOG_FILE)
}

/// Formats one timestamp-prefixed entry. Line pairs alternate English
/// then German; the format follows the legacy import log so existing
/// entries and new ones read the same.
pub fn build_entry(timestamp: &str, workbook_name: &str, summary: &AppendSummary) -> String {
    let mut entry = format!(
        "{timestamp} | ✅ {added} rows added to '{workbook_name}'. ⏱️ Duration: {secs:.2} seconds\n\
         {timestamp} | ✅ {added} Zeilen zu '{workbook_name}' hinzugefügt. ⏱️ Dauer: {secs:.2} Sekunden\n",
        added = summary.added_rows,
        secs = summary.elapsed_secs,
    );

    match summary.header_status {
        HeaderStatus::Matched => {
            entry.push_str(
                "🧠 Headers matched – CSV header row skipped.\n\
                 🧠 Überschriften stimmen überein – CSV-Kopfzeile übersprungen.\n",
            );
        }
        HeaderStatus::Mismatched => {
            entry.push_str(
                "⚠️ Header mismatch – data appended anyway. Please review structure.\n\
                 ⚠️ Überschriften stimmen nicht überein – Daten trotzdem angehängt. Bitte Struktur überprüfen.\n",
            );
            entry.push_str(&format!(
                "CSV headers: {}\nExcel headers: {}\n",
                summary.incoming_headers.iter().join(", "),
                summary.persisted_headers.iter().join(", "),
            ));
        }
    }

    if !summary.skipped_dates.is_empty() {
        let skipped = summary.skipped_dates.iter().map(|d| d.to_string()).join(", ");
        entry.push_str(&format!(
            "❌ Skipped dates (already in Excel): {skipped}\n\
             ❌ Übersprungene Datumswerte (bereits vorhanden): {skipped}\n",
        ));
    }

    if summary.skipped_invalid > 0 {
        entry.push_str(&format!(
            "❌ Rows with unreadable dates skipped: {count}\n\
             ❌ Zeilen mit unlesbarem Datum übersprungen: {count}\n",
            count = summary.skipped_invalid,
        ));
    }

    entry
}

pub fn append_entry(path: &Path, entry: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Opening log file {path:?}"))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("Appending to log file {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(status: HeaderStatus) -> AppendSummary {
        AppendSummary {
            added_rows: 3,
            skipped_dates: vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()],
            skipped_invalid: 0,
            header_status: status,
            incoming_headers: vec!["Date".to_string(), "Amount".to_string()],
            persisted_headers: vec!["Date".to_string(), "Qty".to_string()],
            insertion_row: 11,
            elapsed_secs: 0.5,
        }
    }

    #[test]
    fn entry_pairs_english_and_german_lines() {
        let entry = build_entry("2024-01-05 09:00:00", "cube.xlsx", &summary(HeaderStatus::Matched));
        assert!(entry.contains("3 rows added to 'cube.xlsx'"));
        assert!(entry.contains("3 Zeilen zu 'cube.xlsx' hinzugefügt"));
        assert!(entry.contains("Headers matched"));
        assert!(entry.contains("Skipped dates (already in Excel): 2024-01-01"));
        assert!(entry.contains("Übersprungene Datumswerte"));
    }

    #[test]
    fn mismatched_entry_lists_both_raw_headers() {
        let entry = build_entry("2024-01-05 09:00:00", "cube.xlsx", &summary(HeaderStatus::Mismatched));
        assert!(entry.contains("Header mismatch"));
        assert!(entry.contains("CSV headers: Date, Amount"));
        assert!(entry.contains("Excel headers: Date, Qty"));
    }

    #[test]
    fn invalid_row_count_appears_only_when_nonzero() {
        let mut s = summary(HeaderStatus::Matched);
        let entry = build_entry("ts", "cube.xlsx", &s);
        assert!(!entry.contains("unreadable dates"));
        s.skipped_invalid = 2;
        let entry = build_entry("ts", "cube.xlsx", &s);
        assert!(entry.contains("Rows with unreadable dates skipped: 2"));
        assert!(entry.contains("Zeilen mit unlesbarem Datum übersprungen: 2"));
    }
}

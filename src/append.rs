use std::{
    path::Path,
    time::Instant,
};

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};

use crate::{
    batch::IncomingBatch,
    cli::Cli,
    engine::{self, AppendSummary},
    errors::AppendError,
    io_utils, log_entry, workbook,
};

pub fn execute(args: &Cli) -> Result<()> {
    let started = Instant::now();

    let Some(csv_path) = args.input.as_deref() else {
        warn!("❌ No CSV file selected. / Keine CSV-Datei ausgewählt.");
        return Ok(());
    };
    let Some(workbook_path) = args.workbook.as_deref() else {
        warn!("❌ No Excel file selected. / Keine Excel-Datei ausgewählt.");
        return Ok(());
    };
    info!("📄 CSV file selected: {}", csv_path.display());
    info!("📈 Excel file selected: {}", workbook_path.display());

    let mut incoming = read_incoming(csv_path, args)?;
    let data = workbook::load(workbook_path, args.sheet.as_deref())
        .with_context(|| format!("Loading workbook {workbook_path:?}"))?;
    let sheet = data.target_sheet();
    let persisted_headers = sheet.headers();

    let header_status = engine::reconcile_headers(&incoming.headers, &persisted_headers);
    if header_status.is_matched() {
        info!("🧠 Headers match. CSV header row will be skipped.");
        incoming.drop_duplicate_header_row();
    } else {
        warn!("⚠️ Header mismatch detected. Proceeding anyway.");
        warn!("CSV headers: {}", incoming.headers.join(", "));
        warn!("Excel headers: {}", persisted_headers.join(", "));
    }
    if args.trailer_row {
        incoming.strip_trailer();
    }

    let date_idx = engine::find_column(&incoming.headers, &args.date_column).ok_or_else(|| {
        AppendError::MissingDateColumn {
            column: args.date_column.clone(),
            side: "CSV",
        }
    })?;
    let persisted_date_idx =
        engine::find_column(&persisted_headers, &args.date_column).ok_or_else(|| {
            AppendError::MissingDateColumn {
                column: args.date_column.clone(),
                side: "Excel",
            }
        })?;

    let existing = engine::existing_dates(sheet, persisted_date_idx);
    let outcome = engine::filter_new_rows(incoming.rows, date_idx, &existing);
    if outcome.skipped_invalid > 0 {
        warn!(
            "Skipped {} row(s) with unreadable dates",
            outcome.skipped_invalid
        );
    }

    if outcome.write_set.is_empty() {
        info!("🔁 All dates in the CSV already exist in the Excel file.");
        info!("🔁 Alle Datumswerte aus der CSV-Datei sind bereits vorhanden.");
        return Ok(());
    }

    let insertion_row = engine::insertion_row(sheet);
    info!(
        "📥 Appending {} new row(s) starting at row {insertion_row}...",
        outcome.write_set.len()
    );

    if !args.dry_run {
        workbook::save(
            workbook_path,
            &data,
            &outcome.write_set,
            insertion_row,
            persisted_date_idx,
            date_idx,
        )?;
    }

    let summary = AppendSummary {
        added_rows: outcome.write_set.len(),
        skipped_dates: outcome.skipped_dates,
        skipped_invalid: outcome.skipped_invalid,
        header_status,
        incoming_headers: incoming.headers,
        persisted_headers,
        insertion_row,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let workbook_name = file_name(workbook_path);
    let entry = log_entry::build_entry(&timestamp, &workbook_name, &summary);
    if args.dry_run {
        info!("Dry run – workbook and log left untouched.");
    } else {
        let log_path = args
            .log
            .clone()
            .unwrap_or_else(|| log_entry::default_log_path(workbook_path));
        log_entry::append_entry(&log_path, &entry)?;
        info!("✅ Import complete. / Import abgeschlossen.");
    }
    for line in entry.lines() {
        info!("{line}");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn read_incoming(path: &Path, args: &Cli) -> Result<IncomingBatch> {
    let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {:?}", idx + 2, path))?;
        rows.push(io_utils::decode_record(&record, encoding)?);
    }
    Ok(IncomingBatch { headers, rows })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Builds a single-sheet workbook with a `Date`/`Amount` header and one
    /// row per `(serial, amount)` pair, dates stored numerically the way
    /// the production cube stores them.
    pub fn write_workbook(&self, name: &str, rows: &[(f64, f64)]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let serial_format = Format::new().set_num_format("0");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Date").expect("write header");
        sheet.write_string(0, 1, "Amount").expect("write header");
        for (idx, (serial, amount)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet
                .write_number_with_format(row, 0, *serial, &serial_format)
                .expect("write date serial");
            sheet.write_number(row, 1, *amount).expect("write amount");
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

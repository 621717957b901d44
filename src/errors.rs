use thiserror::Error;

/// Failure kinds that abort a run before any workbook write.
///
/// Header mismatches and unparseable row dates are deliberately absent:
/// those are recovered per-row or downgraded to summary warnings.
#[derive(Debug, Error)]
pub enum AppendError {
    /// The deduplication column is missing from one side.
    #[error("required column '{column}' not found in the {side} header")]
    MissingDateColumn { column: String, side: &'static str },
    /// The requested worksheet does not exist in the workbook.
    #[error("worksheet '{0}' not found in the workbook")]
    SheetNotFound(String),
    /// The target worksheet is empty, so there is no header to reconcile.
    #[error("the target worksheet has no header row")]
    MissingHeaderRow,
}

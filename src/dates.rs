//! Date normalization: best-effort text parsing for CSV fields and Excel
//! 1900-system serial conversion for workbook cells.
//!
//! Both directions honor the workbook format's corrupted epoch: day zero
//! is 1899-12-30, two days before the nominal 1900-01-01, because the
//! serial scale reserves day 60 for the nonexistent 1900-02-29.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::batch::Cell;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Parses a textual date field, trying plain date formats first and then
/// datetime formats with the time component discarded. Returns `None` for
/// anything unparseable; callers decide the exclusion policy.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// Converts a 1900-system serial day count to a calendar date. Serials
/// 1..60 predate the phantom leap day and sit one short of the epoch
/// offset; serial 60 itself collapses onto 1900-02-28.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let mut days = serial.trunc() as u64;
    if (1..60).contains(&days) {
        days += 1;
    }
    excel_epoch().checked_add_days(Days::new(days))
}

/// The inverse of [`date_from_serial`] for dates on or after 1900-01-01.
pub fn serial_from_date(date: NaiveDate) -> i64 {
    let mut days = (date - excel_epoch()).num_days();
    if (1..61).contains(&days) {
        days -= 1;
    }
    days
}

/// Canonical date of a workbook cell: numeric cells go through the serial
/// conversion, text cells through the flexible parser.
pub fn date_from_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(serial) => date_from_serial(*serial),
        Cell::Text(text) => parse_flexible_date(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_flexible_date_supports_multiple_formats() {
        let expected = ymd(2024, 5, 6);
        assert_eq!(parse_flexible_date("2024-05-06"), Some(expected));
        assert_eq!(parse_flexible_date("06/05/2024"), Some(expected));
        assert_eq!(parse_flexible_date("06.05.2024"), Some(expected));
        assert_eq!(parse_flexible_date(" 2024-05-06 14:30:00 "), Some(expected));
    }

    #[test]
    fn parse_flexible_date_rejects_garbage_and_blanks() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("   "), None);
        assert_eq!(parse_flexible_date("not a date"), None);
        assert_eq!(parse_flexible_date("2024-13-40"), None);
    }

    #[test]
    fn serial_conversion_matches_modern_dates() {
        assert_eq!(date_from_serial(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(serial_from_date(ymd(2024, 1, 1)), 45292);
        // Time-of-day fractions are stripped.
        assert_eq!(date_from_serial(45292.75), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn serial_conversion_honors_the_1900_quirk() {
        assert_eq!(date_from_serial(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(date_from_serial(59.0), Some(ymd(1900, 2, 28)));
        // The phantom 1900-02-29 collapses onto the 28th.
        assert_eq!(date_from_serial(60.0), Some(ymd(1900, 2, 28)));
        assert_eq!(date_from_serial(61.0), Some(ymd(1900, 3, 1)));

        assert_eq!(serial_from_date(ymd(1900, 1, 1)), 1);
        assert_eq!(serial_from_date(ymd(1900, 2, 28)), 59);
        assert_eq!(serial_from_date(ymd(1900, 3, 1)), 61);
    }

    #[test]
    fn serial_conversion_rejects_negative_and_non_finite_values() {
        assert_eq!(date_from_serial(-1.0), None);
        assert_eq!(date_from_serial(f64::NAN), None);
        assert_eq!(date_from_serial(f64::INFINITY), None);
    }

    #[test]
    fn date_from_cell_handles_both_representations() {
        assert_eq!(
            date_from_cell(&Cell::Number(45292.0)),
            Some(ymd(2024, 1, 1))
        );
        assert_eq!(
            date_from_cell(&Cell::Text("2024-01-01".to_string())),
            Some(ymd(2024, 1, 1))
        );
        assert_eq!(date_from_cell(&Cell::Empty), None);
        assert_eq!(date_from_cell(&Cell::Bool(true)), None);
    }
}

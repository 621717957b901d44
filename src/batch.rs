#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Blank for the purposes of the insertion-point scan: empty, or
    /// text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
        }
    }
}

/// One worksheet read out of the workbook. `rows[0]` is physical row 1,
/// so the header sits at index 0 and data rows follow.
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetData {
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.iter().map(Cell::as_display).collect())
            .unwrap_or_default()
    }

    pub fn data_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// A freshly loaded CSV batch: decoded header plus raw string rows.
#[derive(Debug, Clone)]
pub struct IncomingBatch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl IncomingBatch {
    /// Drops the duplicated header line these exports carry as their first
    /// data row. Call only after the reconciler reported a match.
    pub fn drop_duplicate_header_row(&mut self) {
        if !self.rows.is_empty() {
            self.rows.remove(0);
        }
    }

    /// Removes the trailing totals row when the source is known to end
    /// with one.
    pub fn strip_trailer(&mut self) {
        self.rows.pop();
    }
}

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, TimeDelta};

use crate::sheet::error::TransformError;

/// A single typed cell value, as inferred by the spreadsheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Excel serial date-time (days since 1899-12-30).
    DateTime(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render the value as text.
    ///
    /// Floats with an integral value render without a fractional part, since
    /// xlsx stores every number as a float and `123` must stay `"123"`.
    /// Date-times render as `YYYY-MM-DD HH:MM:SS`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => float_to_text(*f),
            Cell::Text(s) => s.clone(),
            Cell::Bool(true) => "True".to_owned(),
            Cell::Bool(false) => "False".to_owned(),
            Cell::DateTime(serial) => serial_to_text(*serial),
        }
    }

    /// Numeric view used for ordering comparisons. Text, empty and date-time
    /// cells have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Empty | Cell::Text(_) | Cell::DateTime(_) => None,
        }
    }
}

// Integral floats drop the ".0" even when the column holds blanks; see
// decision 4 in DESIGN.md before changing this.
fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn serial_to_text(serial: f64) -> String {
    let millis = (serial * 86_400_000.0).round();
    let rendered = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_milliseconds(millis as i64))
        .and_then(|(epoch, offset)| epoch.checked_add_signed(offset));
    match rendered {
        Some(dt) if millis.is_finite() => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => float_to_text(serial),
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

/// One data row together with its original positional index.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<Cell>,
}

/// In-memory sheet: named columns and index-tagged rows.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Read the first worksheet of the workbook at `path`. The first row of
    /// the used range is the header; fully blank leading rows and columns
    /// fall outside that range and are skipped.
    pub fn read_xlsx(path: &Path) -> Result<Self, TransformError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(TransformError::NoWorksheet)??;

        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(position, cell)| match Cell::from(cell).to_text() {
                    name if name.is_empty() => format!("Unnamed: {position}"),
                    name => name,
                })
                .collect(),
            None => Vec::new(),
        };

        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row.iter().map(Cell::from).collect());
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    /// Append a row at the next positional index, padding or truncating it
    /// to the column count.
    pub fn push_row(&mut self, cells: Vec<Cell>) {
        let index = self.rows.len();
        self.push_indexed(Row { index, cells });
    }

    /// Append a row keeping the index it already carries.
    pub fn push_indexed(&mut self, mut row: Row) {
        row.cells.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TransformError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_owned()))
    }

    /// Replace every empty cell with empty text.
    pub fn fill_missing(&mut self) {
        for cell in self.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
            if cell.is_empty() {
                *cell = Cell::Text(String::new());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integral_floats_render_as_integers() {
        assert_eq!(Cell::Float(123.0).to_text(), "123");
        assert_eq!(Cell::Float(10.5).to_text(), "10.5");
        assert_eq!(Cell::Int(-4).to_text(), "-4");
        assert_eq!(Cell::Bool(true).to_text(), "True");
        assert_eq!(Cell::Empty.to_text(), "");
    }

    #[test]
    fn date_times_render_as_timestamps() {
        assert_eq!(Cell::DateTime(43831.0).to_text(), "2020-01-01 00:00:00");
        assert_eq!(Cell::DateTime(43831.75).to_text(), "2020-01-01 18:00:00");
    }

    #[test]
    fn only_numeric_cells_compare() {
        assert_eq!(Cell::Int(3).as_number(), Some(3.0));
        assert_eq!(Cell::Bool(false).as_number(), Some(0.0));
        assert_eq!(Cell::text("5").as_number(), None);
        assert_eq!(Cell::text("").as_number(), None);
    }

    #[test]
    fn push_row_assigns_positions_and_pads() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Cell::Int(1)]);
        table.push_row(vec![Cell::Int(2), Cell::Int(3), Cell::Int(4)]);

        assert_eq!(table.rows()[0].index, 0);
        assert_eq!(table.rows()[0].cells, vec![Cell::Int(1), Cell::Empty]);
        assert_eq!(table.rows()[1].index, 1);
        assert_eq!(table.rows()[1].cells.len(), 2);
    }

    #[test]
    fn fill_missing_replaces_empty_cells() {
        let mut table = Table::new(vec!["a".into()]);
        table.push_row(vec![Cell::Empty]);
        table.push_row(vec![Cell::Int(7)]);
        table.fill_missing();

        assert_eq!(table.rows()[0].cells[0], Cell::text(""));
        assert_eq!(table.rows()[1].cells[0], Cell::Int(7));
    }

    #[test]
    fn missing_column_names_the_column() {
        let table = Table::new(vec!["a".into()]);
        let err = table.column_index("b").unwrap_err();
        assert_eq!(err.to_string(), "missing column 'b'");
    }
}

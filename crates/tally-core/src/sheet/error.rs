use thiserror::Error;

/// Everything that can abort building a report.
///
/// The `Display` text is what a failed task reports to clients.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to read spreadsheet: {0}")]
    Read(#[from] calamine::Error),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// A strictly parsed column held a value that is not an integer.
    #[error("invalid literal for integer in column '{column}' at row {row}: '{value}'")]
    InvalidInteger {
        column: &'static str,
        row: usize,
        value: String,
    },

    /// A value that must be compared numerically is text or empty.
    #[error("column '{column}' at row {row} is not numeric: '{value}'")]
    NotNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("report does not fit in a worksheet")]
    SheetTooLarge,

    #[error("failed to write spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

//! Spreadsheet loading, cleaning and report generation.

mod error;
mod parse;
mod report;
mod table;
mod writer;

pub use error::TransformError;
pub use parse::{StrictParseError, lenient_parse, strict_parse};
pub use report::{
    DISCREPANCY, MATERIAL_ID, RECEIVED_TOTAL, REQUESTED_QUANTITY, ReportSummary,
    build_discrepancy_report, discrepancy_report,
};
pub use table::{Cell, Row, Table};
pub use writer::write_xlsx;

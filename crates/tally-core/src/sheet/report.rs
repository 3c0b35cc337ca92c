use std::path::Path;

use crate::sheet::error::TransformError;
use crate::sheet::parse::{lenient_parse, strict_parse};
use crate::sheet::table::{Cell, Table};
use crate::sheet::writer::write_xlsx;

/// Material identifier; cleaned with [`strict_parse`].
pub const MATERIAL_ID: &str = "ID Материала";
/// Requested quantity; cleaned with [`lenient_parse`].
pub const REQUESTED_QUANTITY: &str = "Кол-во по заявке";
/// Received total; compared as-is.
pub const RECEIVED_TOTAL: &str = "Поступило всего";
/// Derived column appended to the report.
pub const DISCREPANCY: &str = "Расхождение заявка-приход";

/// Row counts of a finished report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub rows_read: usize,
    pub rows_retained: usize,
}

/// Read the sheet at `input`, build the discrepancy report and write it to
/// `output`.
pub fn build_discrepancy_report(
    input: &Path,
    output: &Path,
) -> Result<ReportSummary, TransformError> {
    let table = Table::read_xlsx(input)?;
    let rows_read = table.len();

    let report = discrepancy_report(table)?;
    write_xlsx(&report, output)?;

    Ok(ReportSummary {
        rows_read,
        rows_retained: report.len(),
    })
}

/// Clean the material and requested columns, keep rows where more was
/// requested than received, and append the difference.
///
/// Retained rows keep their original positional index.
pub fn discrepancy_report(mut table: Table) -> Result<Table, TransformError> {
    table.fill_missing();

    let material = table.column_index(MATERIAL_ID)?;
    let requested = table.column_index(REQUESTED_QUANTITY)?;
    let received = table.column_index(RECEIVED_TOTAL)?;

    for row in table.rows_mut() {
        let text = row.cells[material].to_text();
        let id = strict_parse(&text).map_err(|err| TransformError::InvalidInteger {
            column: MATERIAL_ID,
            row: row.index,
            value: err.0,
        })?;
        row.cells[material] = Cell::Int(id);
    }

    for row in table.rows_mut() {
        let text = row.cells[requested].to_text();
        row.cells[requested] = Cell::Float(lenient_parse(&text));
    }

    // Every received value has to be numeric before any row is compared.
    let received_values = table
        .rows()
        .iter()
        .map(|row| {
            let cell = &row.cells[received];
            cell.as_number().ok_or_else(|| TransformError::NotNumeric {
                column: RECEIVED_TOTAL,
                row: row.index,
                value: cell.to_text(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let (mut columns, rows) = table.into_parts();
    columns.push(DISCREPANCY.to_owned());
    let mut report = Table::new(columns);

    for (mut row, received_value) in rows.into_iter().zip(received_values) {
        let requested_value = row.cells[requested].as_number().unwrap_or(f64::NAN);
        // NaN never compares greater, so unparseable quantities drop out here.
        if requested_value > received_value {
            row.cells.push(Cell::Float(requested_value - received_value));
            report.push_indexed(row);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sheet::fixtures::{scratch_dir, write_fixture};

    fn header() -> Vec<String> {
        vec![
            MATERIAL_ID.into(),
            "Наименование".into(),
            REQUESTED_QUANTITY.into(),
            RECEIVED_TOTAL.into(),
        ]
    }

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        let mut table = Table::new(header());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn keeps_only_rows_with_shortfall() {
        let input = table(vec![
            vec![Cell::Int(1), Cell::text("a"), Cell::Int(10), Cell::Int(5)],
            vec![Cell::Int(2), Cell::text("b"), Cell::Int(5), Cell::Int(5)],
            vec![Cell::Int(3), Cell::text("c"), Cell::Int(3), Cell::Int(8)],
            vec![Cell::Int(4), Cell::text("d"), Cell::text("garbage"), Cell::Int(1)],
        ]);

        let report = discrepancy_report(input).expect("report");

        assert_eq!(report.columns().last().map(String::as_str), Some(DISCREPANCY));
        assert_eq!(report.len(), 1);
        let row = &report.rows()[0];
        assert_eq!(row.index, 0);
        assert_eq!(row.cells[0], Cell::Int(1));
        assert_eq!(row.cells[2], Cell::Float(10.0));
        assert_eq!(row.cells[4], Cell::Float(5.0));
    }

    #[test]
    fn retained_rows_keep_original_index() {
        let input = table(vec![
            vec![Cell::Int(1), Cell::Empty, Cell::Int(1), Cell::Int(5)],
            vec![Cell::Int(2), Cell::Empty, Cell::Int(9), Cell::Float(2.5)],
        ]);

        let report = discrepancy_report(input).expect("report");
        assert_eq!(report.len(), 1);
        assert_eq!(report.rows()[0].index, 1);
        assert_eq!(report.rows()[0].cells[4], Cell::Float(6.5));
        // Missing values were filled with empty text.
        assert_eq!(report.rows()[0].cells[1], Cell::text(""));
    }

    #[test]
    fn material_id_substitutes_capital_i() {
        let input = table(vec![
            vec![Cell::text("I23"), Cell::Empty, Cell::Int(2), Cell::Int(1)],
            vec![Cell::Float(45.0), Cell::Empty, Cell::Int(2), Cell::Int(1)],
        ]);

        let report = discrepancy_report(input).expect("report");
        assert_eq!(report.rows()[0].cells[0], Cell::Int(123));
        assert_eq!(report.rows()[1].cells[0], Cell::Int(45));
    }

    #[test]
    fn unparseable_material_id_fails_everything() {
        let input = table(vec![
            vec![Cell::Int(1), Cell::Empty, Cell::Int(2), Cell::Int(1)],
            vec![Cell::text("abc"), Cell::Empty, Cell::Int(2), Cell::Int(1)],
        ]);

        let err = discrepancy_report(input).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidInteger { row: 1, ref value, .. } if value == "abc"
        ));
    }

    #[test]
    fn date_material_id_fails() {
        let input = table(vec![vec![
            Cell::DateTime(43831.0),
            Cell::Empty,
            Cell::Int(2),
            Cell::Int(1),
        ]]);

        let err = discrepancy_report(input).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidInteger { row: 0, ref value, .. }
                if value == "2020-01-01 00:00:00"
        ));
    }

    #[test]
    fn date_formatted_material_id_in_workbook_fails() {
        let dir = scratch_dir();
        let input = dir.join("dated.xlsx");
        write_fixture(
            &input,
            &header(),
            &[vec![Cell::DateTime(43831.0), Cell::Empty, Cell::Int(10), Cell::Int(5)]],
        );

        let err = build_discrepancy_report(&input, &dir.join("out.xlsx")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidInteger { .. }));
        assert!(!dir.join("out.xlsx").exists());
    }

    #[test]
    fn empty_material_id_fails() {
        let input = table(vec![vec![Cell::Empty, Cell::Empty, Cell::Int(2), Cell::Int(1)]]);
        assert!(matches!(
            discrepancy_report(input),
            Err(TransformError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn requested_quantity_strips_non_digits() {
        let input = table(vec![vec![
            Cell::Int(1),
            Cell::Empty,
            Cell::text("12 шт."),
            Cell::Int(2),
        ]]);

        let report = discrepancy_report(input).expect("report");
        assert_eq!(report.rows()[0].cells[2], Cell::Float(12.0));
        assert_eq!(report.rows()[0].cells[4], Cell::Float(10.0));
    }

    #[test]
    fn text_received_total_fails() {
        let input = table(vec![vec![Cell::Int(1), Cell::Empty, Cell::Int(5), Cell::Empty]]);

        let err = discrepancy_report(input).unwrap_err();
        assert!(matches!(err, TransformError::NotNumeric { row: 0, .. }));
    }

    #[test]
    fn missing_column_fails() {
        let mut input = Table::new(vec![MATERIAL_ID.into(), RECEIVED_TOTAL.into()]);
        input.push_row(vec![Cell::Int(1), Cell::Int(1)]);

        let err = discrepancy_report(input).unwrap_err();
        assert_eq!(err.to_string(), format!("missing column '{REQUESTED_QUANTITY}'"));
    }

    #[test]
    fn report_round_trips_through_files() {
        let dir = scratch_dir();
        let input = dir.join("upload.xlsx");
        let output = dir.join("result.xlsx");
        write_fixture(
            &input,
            &header(),
            &[
                vec![Cell::text("I7"), Cell::text("болт"), Cell::Int(10), Cell::Int(5)],
                vec![Cell::Int(8), Cell::text("гайка"), Cell::Int(5), Cell::Int(5)],
                vec![Cell::Int(9), Cell::text("шайба"), Cell::Int(3), Cell::Int(8)],
                vec![Cell::Int(10), Cell::text("винт"), Cell::text("—"), Cell::Int(1)],
            ],
        );

        let summary = build_discrepancy_report(&input, &output).expect("report");
        assert_eq!(
            summary,
            ReportSummary {
                rows_read: 4,
                rows_retained: 1
            }
        );

        let written = Table::read_xlsx(&output).expect("read result");
        assert_eq!(
            written.columns(),
            &[
                "Unnamed: 0",
                MATERIAL_ID,
                "Наименование",
                REQUESTED_QUANTITY,
                RECEIVED_TOTAL,
                DISCREPANCY
            ]
        );
        assert_eq!(written.len(), 1);
        let cells = &written.rows()[0].cells;
        assert_eq!(cells[0].as_number(), Some(0.0));
        assert_eq!(cells[1].as_number(), Some(17.0));
        assert_eq!(cells[2], Cell::text("болт"));
        assert_eq!(cells[5].as_number(), Some(5.0));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unreadable_input_is_a_read_error() {
        let dir = scratch_dir();
        let input = dir.join("upload.xlsx");
        std::fs::write(&input, b"not a zip archive").expect("write");

        let err = build_discrepancy_report(&input, &dir.join("result.xlsx")).unwrap_err();
        assert!(matches!(err, TransformError::Read(_)));
        assert!(!dir.join("result.xlsx").exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}

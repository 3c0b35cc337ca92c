use std::path::Path;

use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook};

use crate::sheet::error::TransformError;
use crate::sheet::table::{Cell, Table};

/// Write `table` as a single-sheet workbook.
///
/// The first column holds each row's positional index under a blank header;
/// the table's own columns follow in order.
pub fn write_xlsx(table: &Table, path: &Path) -> Result<(), TransformError> {
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let date_time = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_blank(0, 0, &header)?;
    for (position, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(position + 1)?, name.as_str(), &header)?;
    }

    for (position, row) in table.rows().iter().enumerate() {
        let r = row_num(position + 1)?;
        worksheet.write_number(r, 0, row.index as f64)?;

        for (c, cell) in row.cells.iter().enumerate() {
            let c = col_num(c + 1)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s.as_str())?;
                }
                Cell::Int(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                // NaN and infinities have no xlsx representation; leave blank.
                Cell::Float(f) if !f.is_finite() => {}
                Cell::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Cell::DateTime(serial) => {
                    worksheet.write_number_with_format(r, c, *serial, &date_time)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn row_num(n: usize) -> Result<RowNum, TransformError> {
    RowNum::try_from(n).map_err(|_| TransformError::SheetTooLarge)
}

fn col_num(n: usize) -> Result<ColNum, TransformError> {
    ColNum::try_from(n).map_err(|_| TransformError::SheetTooLarge)
}

// Excel workbook loading via calamine
use crate::domain::coercion::{excel_serial_to_datetime, parse_date_str};
use crate::domain::dataset::{CellValue, Dataset};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error(transparent)]
    Excel(#[from] calamine::Error),
    #[error("workbook contains no worksheets")]
    NoWorksheet,
    #[error("snapshot is malformed: {0}")]
    Snapshot(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read the first worksheet of an .xlsx/.xls workbook. The format is sniffed
/// from the content, not the file name. The first row is the header.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Dataset, WorkbookError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(WorkbookError::NoWorksheet)??;

    // The range starts at the first used cell; blank leading columns still
    // count as (unnamed, all-null) columns.
    let leading = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let convert_row = |row: &[Data]| -> Vec<CellValue> {
        std::iter::repeat_n(CellValue::Null, leading)
            .chain(row.iter().map(convert_cell))
            .collect()
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Dataset::empty());
    };
    let header = convert_row(header);
    let body: Vec<Vec<CellValue>> = rows.map(convert_row).collect();

    tracing::debug!(
        "Loaded worksheet with {} columns and {} rows",
        header.len(),
        body.len()
    );

    Ok(Dataset::from_raw_header(&header, body))
}

pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Number(dt.as_f64())
            } else {
                excel_serial_to_datetime(dt.as_f64())
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Null)
            }
        }
        Data::DateTimeIso(s) => parse_date_str(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn build_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Sales").unwrap();
        sheet.write_string(0, 2, "Category").unwrap();

        let day = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        sheet.write_datetime_with_format(1, 0, &day, &date_format).unwrap();
        sheet.write_number(1, 1, 12.5).unwrap();
        sheet.write_string(1, 2, "Online").unwrap();

        sheet.write_string(2, 0, "16/01/2024").unwrap();
        sheet.write_number(2, 1, 3.0).unwrap();
        sheet.write_boolean(2, 2, true).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_workbook() {
        let dataset = read_workbook(build_xlsx()).unwrap();
        assert_eq!(dataset.columns(), &["Date", "Sales", "Category"]);
        assert_eq!(dataset.row_count(), 2);

        let expected_day = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(dataset.rows()[0][0], CellValue::DateTime(expected_day));
        assert_eq!(dataset.rows()[0][1], CellValue::Number(12.5));
        assert_eq!(dataset.rows()[1][0], CellValue::Text("16/01/2024".to_string()));
        assert_eq!(dataset.rows()[1][2], CellValue::Bool(true));
    }

    #[test]
    fn test_blank_leading_column_is_kept() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "Sales").unwrap();
        sheet.write_number(1, 1, 3.0).unwrap();

        let dataset = read_workbook(workbook.save_to_buffer().unwrap()).unwrap();
        assert_eq!(dataset.columns(), &["Unnamed: 0", "Sales"]);
        assert_eq!(dataset.rows()[0], vec![CellValue::Null, CellValue::Number(3.0)]);
        assert_eq!(dataset.missing_cells(), 1);
    }

    #[test]
    fn test_rejects_non_workbook_bytes() {
        let result = read_workbook(b"date,sales\n2024-01-01,3\n".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_sheet_is_empty_dataset() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let dataset = read_workbook(workbook.save_to_buffer().unwrap()).unwrap();
        assert_eq!(dataset.row_count(), 0);
        assert_eq!(dataset.column_count(), 0);
    }

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
        assert_eq!(convert_cell(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-02-03".to_string())),
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 2, 3)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }
}

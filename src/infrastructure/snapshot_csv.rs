// CSV snapshot of a parsed workbook
use crate::domain::dataset::{CellValue, Dataset};
use crate::infrastructure::workbook_reader::WorkbookError;
use std::io::{Read, Write};

pub fn write_snapshot<W: Write>(dataset: &Dataset, writer: W) -> Result<(), WorkbookError> {
    // csv writes a zero-field record as `""`, which would read back as one column.
    if dataset.column_count() == 0 {
        return Ok(());
    }
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        csv_writer.write_record(row.iter().map(CellValue::display))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Load a snapshot, re-typing each field from its text.
pub fn read_snapshot<R: Read>(reader: R) -> Result<Dataset, WorkbookError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(retype_field).collect());
    }

    if columns.is_empty() && rows.is_empty() {
        return Ok(Dataset::empty());
    }
    Ok(Dataset::new(columns, rows))
}

fn retype_field(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Null;
    }
    match field {
        "True" => return CellValue::Bool(true),
        "False" => return CellValue::Bool(false),
        _ => {}
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

// Dataset domain model
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// A single spreadsheet cell after loading.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Null cells and blank text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 && dt.time().nanosecond() == 0 {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// Numbers compare by value; every NaN is equal to every other NaN so that
// duplicate detection treats them like nulls.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => {
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0.0f64.to_bits()
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            CellValue::Bool(b) => b.hash(state),
            CellValue::DateTime(dt) => dt.hash(state),
        }
    }
}

/// Declared type of a column, inferred from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    DateTime,
    Boolean,
    Text,
    Empty,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from already-normalised column names. Rows are padded
    /// with nulls or truncated to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Build a dataset from a raw header row, applying header normalisation.
    pub fn from_raw_header(header: &[CellValue], rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(normalize_headers(header), rows)
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the cells of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut seen = None;
        for cell in self.column_values(index) {
            let kind = match cell {
                CellValue::Null => continue,
                CellValue::Number(_) => ColumnType::Numeric,
                CellValue::DateTime(_) => ColumnType::DateTime,
                CellValue::Bool(_) => ColumnType::Boolean,
                CellValue::Text(_) => return ColumnType::Text,
            };
            match seen {
                None => seen = Some(kind),
                Some(prev) if prev != kind => return ColumnType::Text,
                Some(_) => {}
            }
        }
        seen.unwrap_or(ColumnType::Empty)
    }

    /// Number of null cells plus blank-text cells.
    pub fn missing_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_blank())
            .count()
    }

    /// Number of rows equal in every column to some earlier row.
    pub fn duplicate_rows(&self) -> usize {
        let mut seen: HashSet<&[CellValue]> = HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .filter(|row| !seen.insert(row.as_slice()))
            .count()
    }
}

/// Empty headers become `Unnamed: <idx>`; repeated headers get `.1`, `.2`, ...
pub fn normalize_headers(header: &[CellValue]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let raw = cell.display().trim().to_string();
        let base = if raw.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

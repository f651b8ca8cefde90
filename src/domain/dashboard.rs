// Dashboard domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub name: String,
    pub value: usize,
}

impl Kpi {
    pub fn new(name: &str, value: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// One (label, value) point of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: String, value: f64) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub points: Vec<SeriesPoint>,
}

impl ChartData {
    pub fn new(title: String, kind: ChartKind, points: Vec<SeriesPoint>) -> Self {
        Self {
            title,
            kind,
            points,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnRoles {
    pub date: Option<String>,
    pub numeric: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub file_name: String,
    pub columns: Vec<String>,
    pub kpis: Vec<Kpi>,
    /// Display strings of the first rows, nulls rendered empty.
    pub preview: Vec<Vec<String>>,
    pub roles: ColumnRoles,
    pub bar: ChartData,
    pub line: ChartData,
}

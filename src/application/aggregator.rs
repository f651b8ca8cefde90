// Aggregator - KPIs, category frequencies and date trends
use crate::domain::coercion::{coerce_number, parse_date};
use crate::domain::dashboard::{Kpi, SeriesPoint};
use crate::domain::dataset::Dataset;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub const KPI_ROWS: &str = "Rows";
pub const KPI_COLUMNS: &str = "Columns";
pub const KPI_MISSING: &str = "Missing cells";
pub const KPI_DUPLICATES: &str = "Duplicate rows";

pub fn compute_kpis(dataset: &Dataset) -> Vec<Kpi> {
    vec![
        Kpi::new(KPI_ROWS, dataset.row_count()),
        Kpi::new(KPI_COLUMNS, dataset.column_count()),
        Kpi::new(KPI_MISSING, dataset.missing_cells()),
        Kpi::new(KPI_DUPLICATES, dataset.duplicate_rows()),
    ]
}

/// Label under which null cells are counted.
pub const NULL_CATEGORY: &str = "nan";

/// Most frequent trimmed values of a column. Blank text is discarded, null
/// cells count as [`NULL_CATEGORY`]. Equal counts keep the order in which
/// values were first seen.
pub fn top_categories(dataset: &Dataset, column: &str, limit: usize) -> Vec<SeriesPoint> {
    let Some(idx) = dataset.column_index(column) else {
        return Vec::new();
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for cell in dataset.column_values(idx) {
        let value = if cell.is_null() {
            NULL_CATEGORY.to_string()
        } else {
            cell.display().trim().to_string()
        };
        if value.is_empty() {
            continue;
        }
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    // Stable sort preserves first-seen order for ties.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(limit)
        .map(|value| {
            let count = counts[&value];
            SeriesPoint::new(value, count as f64)
        })
        .collect()
}

/// Per-day sum of `value_column` over `date_column`, ascending by day,
/// first `limit` days. Rows where either side fails to parse are dropped.
pub fn date_trend(
    dataset: &Dataset,
    date_column: &str,
    value_column: &str,
    limit: usize,
) -> Vec<SeriesPoint> {
    let (Some(date_idx), Some(value_idx)) = (
        dataset.column_index(date_column),
        dataset.column_index(value_column),
    ) else {
        return Vec::new();
    };

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in dataset.rows() {
        let date = row.get(date_idx).and_then(parse_date);
        let value = row.get(value_idx).and_then(coerce_number);
        if let (Some(date), Some(value)) = (date, value) {
            *buckets.entry(date.date()).or_insert(0.0) += value;
        }
    }

    buckets
        .into_iter()
        .take(limit)
        .map(|(day, total)| SeriesPoint::new(day.format("%Y-%m-%d").to_string(), total))
        .collect()
}

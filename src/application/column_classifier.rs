// Column classifier - Heuristic selection of date, numeric and category columns
use crate::domain::coercion::{coerce_number, parse_date};
use crate::domain::dashboard::ColumnRoles;
use crate::domain::dataset::{ColumnType, Dataset};
use crate::infrastructure::config::HeuristicsConfig;

#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    heuristics: HeuristicsConfig,
}

impl ColumnClassifier {
    pub fn new(heuristics: HeuristicsConfig) -> Self {
        Self { heuristics }
    }

    /// Assign at most one column to each role. Never fails; an empty dataset
    /// gets no roles at all.
    pub fn classify(&self, dataset: &Dataset) -> ColumnRoles {
        let roles = ColumnRoles {
            date: self.find_date_column(dataset),
            numeric: self.find_numeric_column(dataset),
            category: self.find_category_column(dataset),
        };
        tracing::debug!(
            "Column roles: date={:?}, numeric={:?}, category={:?}",
            roles.date,
            roles.numeric,
            roles.category
        );
        roles
    }

    pub fn find_date_column(&self, dataset: &Dataset) -> Option<String> {
        if let Some(name) = first_present(dataset, &self.heuristics.date_candidates) {
            return Some(name);
        }

        (0..dataset.column_count())
            .filter(|&idx| dataset.column_type(idx) == ColumnType::Text)
            .find(|&idx| self.mostly_dates(dataset, idx))
            .map(|idx| dataset.columns()[idx].clone())
    }

    pub fn find_numeric_column(&self, dataset: &Dataset) -> Option<String> {
        let candidate = self
            .heuristics
            .numeric_candidates
            .iter()
            .filter_map(|name| dataset.column_index(name))
            .find(|&idx| numeric_coercible(dataset, idx));

        candidate
            .or_else(|| {
                (0..dataset.column_count())
                    .find(|&idx| dataset.column_type(idx) == ColumnType::Numeric)
            })
            .map(|idx| dataset.columns()[idx].clone())
    }

    pub fn find_category_column(&self, dataset: &Dataset) -> Option<String> {
        if let Some(name) = first_present(dataset, &self.heuristics.category_candidates) {
            return Some(name);
        }

        (0..dataset.column_count())
            .find(|&idx| dataset.column_type(idx) == ColumnType::Text)
            .map(|idx| dataset.columns()[idx].clone())
    }

    fn mostly_dates(&self, dataset: &Dataset, idx: usize) -> bool {
        let mut non_null = 0usize;
        let mut parsed = 0usize;
        for cell in dataset.column_values(idx).filter(|c| !c.is_null()) {
            non_null += 1;
            if parse_date(cell).is_some() {
                parsed += 1;
            }
        }
        non_null > 0 && parsed as f64 / non_null as f64 >= self.heuristics.date_parse_threshold
    }
}

fn first_present(dataset: &Dataset, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|name| dataset.column_index(name).is_some())
        .cloned()
}

/// At least one non-blank value, and every non-blank value is a number.
fn numeric_coercible(dataset: &Dataset, idx: usize) -> bool {
    let mut any = false;
    for cell in dataset.column_values(idx).filter(|c| !c.is_blank()) {
        if coerce_number(cell).is_none() {
            return false;
        }
        any = true;
    }
    any
}

// Dashboard service - Use case for building a dashboard from the current upload
use crate::application::aggregator::{compute_kpis, date_trend, top_categories};
use crate::application::column_classifier::ColumnClassifier;
use crate::application::upload_repository::UploadRepository;
use crate::domain::dashboard::{ChartData, ChartKind, Dashboard};
use crate::domain::dataset::{CellValue, Dataset};
use crate::infrastructure::config::DashboardSettings;
use crate::infrastructure::workbook_reader::WorkbookError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No uploaded file found. Please upload an Excel file first.")]
    NoUpload,
    #[error("Failed to read Excel: {0}")]
    Unreadable(#[from] WorkbookError),
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn UploadRepository>,
    classifier: ColumnClassifier,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn UploadRepository>,
        classifier: ColumnClassifier,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            repository,
            classifier,
            settings,
        }
    }

    /// Build the dashboard for the caller's current upload, if any.
    pub async fn get_dashboard(&self, current: Option<&str>) -> Result<Dashboard, DashboardError> {
        let Some(stored_name) = current else {
            return Err(DashboardError::NoUpload);
        };
        if !self.repository.exists(stored_name).await {
            return Err(DashboardError::NoUpload);
        }

        let dataset = self.repository.load_dataset(stored_name).await?;
        Ok(self.build_dashboard(stored_name, &dataset))
    }

    pub fn build_dashboard(&self, file_name: &str, dataset: &Dataset) -> Dashboard {
        let roles = self.classifier.classify(dataset);

        let bar = match &roles.category {
            Some(category) => ChartData::new(
                format!("Top values ({})", category),
                ChartKind::Bar,
                top_categories(dataset, category, self.settings.top_categories),
            ),
            None => ChartData::new("Top values".to_string(), ChartKind::Bar, Vec::new()),
        };

        let trend = match (&roles.date, &roles.numeric) {
            (Some(date), Some(numeric)) => {
                let points = date_trend(dataset, date, numeric, self.settings.trend_points);
                if points.is_empty() {
                    None
                } else {
                    Some(ChartData::new(
                        format!("Trend: {} by {}", numeric, date),
                        ChartKind::Line,
                        points,
                    ))
                }
            }
            _ => None,
        };
        let line = trend
            .unwrap_or_else(|| ChartData::new("Trend".to_string(), ChartKind::Line, Vec::new()));

        let preview = dataset
            .rows()
            .iter()
            .take(self.settings.preview_rows)
            .map(|row| row.iter().map(CellValue::display).collect())
            .collect();

        Dashboard {
            file_name: file_name.to_string(),
            columns: dataset.columns().to_vec(),
            kpis: compute_kpis(dataset),
            preview,
            roles,
            bar,
            line,
        }
    }
}

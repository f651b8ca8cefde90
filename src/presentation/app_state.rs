// Application state for HTTP handlers
use crate::application::column_classifier::ColumnClassifier;
use crate::application::dashboard_service::DashboardService;
use crate::application::upload_service::UploadService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fs_upload_repository::FsUploadRepository;
use crate::infrastructure::views::Views;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub upload_service: UploadService,
    pub dashboard_service: DashboardService,
    pub views: Arc<Views>,
}

impl AppState {
    /// Wire repository, services and views from configuration.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let repository = Arc::new(FsUploadRepository::new(&config.storage.upload_dir));
        repository.ensure_dir().await?;

        let upload_service = UploadService::new(repository.clone(), config.storage.snapshot_cache);
        let dashboard_service = DashboardService::new(
            repository,
            ColumnClassifier::new(config.heuristics.clone()),
            config.dashboard.clone(),
        );

        Ok(Self {
            upload_service,
            dashboard_service,
            views: Arc::new(Views::new()?),
        })
    }
}

// Repository trait for stored uploads
use crate::domain::dataset::Dataset;
use crate::infrastructure::workbook_reader::WorkbookError;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Persist an upload under a fresh stored name and return that name
    async fn save(&self, original_name: &str, data: Bytes) -> std::io::Result<String>;

    /// Whether a stored upload is still present
    async fn exists(&self, stored_name: &str) -> bool;

    /// Remove a stored upload and any snapshot derived from it
    async fn remove(&self, stored_name: &str) -> std::io::Result<()>;

    /// Parse the workbook and cache a tabular snapshot beside it
    async fn cache_snapshot(&self, stored_name: &str) -> Result<(), WorkbookError>;

    /// Load the dataset for a stored upload, preferring its snapshot
    async fn load_dataset(&self, stored_name: &str) -> Result<Dataset, WorkbookError>;
}

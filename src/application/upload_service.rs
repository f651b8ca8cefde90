// Upload service - Use case for accepting a spreadsheet upload
use crate::application::upload_repository::UploadRepository;
use crate::domain::upload::allowed_file;
use crate::infrastructure::workbook_reader::WorkbookError;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part in request.")]
    MissingFilePart,
    #[error("No file selected.")]
    NoFileSelected,
    #[error("Only Excel files are allowed (.xlsx / .xls).")]
    UnsupportedExtension,
    #[error("Failed to read Excel: {0}")]
    Unreadable(#[from] WorkbookError),
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct UploadService {
    repository: Arc<dyn UploadRepository>,
    snapshot_cache: bool,
}

impl UploadService {
    pub fn new(repository: Arc<dyn UploadRepository>, snapshot_cache: bool) -> Self {
        Self {
            repository,
            snapshot_cache,
        }
    }

    /// Validate and store an upload, returning its stored name.
    pub async fn upload(&self, filename: &str, data: Bytes) -> Result<String, UploadError> {
        if filename.is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        if !allowed_file(filename) {
            return Err(UploadError::UnsupportedExtension);
        }

        let stored = self.repository.save(filename, data).await?;

        if self.snapshot_cache {
            if let Err(e) = self.repository.cache_snapshot(&stored).await {
                tracing::warn!("Rejecting unreadable upload {}: {}", stored, e);
                if let Err(remove_err) = self.repository.remove(&stored).await {
                    tracing::error!("Failed to remove rejected upload {}: {}", stored, remove_err);
                }
                return Err(e.into());
            }
        }

        Ok(stored)
    }
}

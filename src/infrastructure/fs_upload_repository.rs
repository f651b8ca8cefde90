// Filesystem upload repository
use crate::application::upload_repository::UploadRepository;
use crate::domain::dataset::Dataset;
use crate::domain::upload::{is_valid_stored_name, secure_filename, stored_name};
use crate::infrastructure::snapshot_csv::{read_snapshot, write_snapshot};
use crate::infrastructure::workbook_reader::{read_workbook, WorkbookError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const SNAPSHOT_SUFFIX: &str = ".snapshot.csv";
const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Clone)]
pub struct FsUploadRepository {
    upload_dir: PathBuf,
}

impl FsUploadRepository {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await
    }

    fn upload_path(&self, stored_name: &str) -> std::io::Result<PathBuf> {
        if !is_valid_stored_name(stored_name) {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid stored upload name: {}", stored_name),
            ));
        }
        Ok(self.upload_dir.join(stored_name))
    }

    fn snapshot_path(&self, stored_name: &str) -> std::io::Result<PathBuf> {
        self.upload_path(&format!("{}{}", stored_name, SNAPSHOT_SUFFIX))
    }

    async fn parse_upload(&self, stored_name: &str) -> Result<Dataset, WorkbookError> {
        let bytes = tokio::fs::read(self.upload_path(stored_name)?).await?;
        // Workbook parsing is CPU-bound
        tokio::task::spawn_blocking(move || read_workbook(bytes))
            .await
            .map_err(|e| WorkbookError::Io(std::io::Error::other(e)))?
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl UploadRepository for FsUploadRepository {
    async fn save(&self, original_name: &str, data: Bytes) -> std::io::Result<String> {
        let now = chrono::Local::now().naive_local();
        let base = stored_name(original_name, now);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!(
                    "{}_{}_{}",
                    now.format("%Y%m%d_%H%M%S"),
                    attempt,
                    secure_filename(original_name)
                )
            };

            let path = self.upload_path(&name)?;
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match file {
                Ok(mut file) => {
                    file.write_all(&data).await?;
                    file.flush().await?;
                    tracing::info!("Stored upload {} ({} bytes)", name, data.len());
                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free upload name for {}", base),
        ))
    }

    async fn exists(&self, stored_name: &str) -> bool {
        match self.upload_path(stored_name) {
            Ok(path) => is_file(&path).await,
            Err(_) => false,
        }
    }

    async fn remove(&self, stored_name: &str) -> std::io::Result<()> {
        for path in [self.upload_path(stored_name)?, self.snapshot_path(stored_name)?] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn cache_snapshot(&self, stored_name: &str) -> Result<(), WorkbookError> {
        let dataset = self.parse_upload(stored_name).await?;
        let path = self.snapshot_path(stored_name)?;

        tokio::task::spawn_blocking(move || -> Result<(), WorkbookError> {
            let file = std::fs::File::create(&path)?;
            write_snapshot(&dataset, std::io::BufWriter::new(file))
        })
        .await
        .map_err(|e| WorkbookError::Io(std::io::Error::other(e)))??;

        tracing::debug!("Cached snapshot for {}", stored_name);
        Ok(())
    }

    async fn load_dataset(&self, stored_name: &str) -> Result<Dataset, WorkbookError> {
        let snapshot = self.snapshot_path(stored_name)?;
        if is_file(&snapshot).await {
            let bytes = tokio::fs::read(&snapshot).await?;
            return read_snapshot(bytes.as_slice());
        }
        self.parse_upload(stored_name).await
    }
}

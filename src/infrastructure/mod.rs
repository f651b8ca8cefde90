// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod fs_upload_repository;
pub mod http_response;
pub mod snapshot_csv;
pub mod views;
pub mod workbook_reader;

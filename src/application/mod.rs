// Application layer - Use cases and ports
pub mod aggregator;
pub mod column_classifier;
pub mod dashboard_service;
pub mod upload_repository;
pub mod upload_service;

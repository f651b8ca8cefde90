// Domain layer - Dataset and dashboard models
pub mod coercion;
pub mod dashboard;
pub mod dataset;
pub mod upload;

mod app;
mod backend;
mod config;
mod ingest;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use backend::{BackendError, BackendOperation};
pub use config::ConfigError;
pub use ingest::IngestError;
pub use validation::ValidationError;

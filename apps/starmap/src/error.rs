//! # Application Errors
//!
//! Failures outside a request: startup, configuration and CLI commands.
//! Request-time failures are [`crate::api::ApiError`].

use crate::config::ConfigError;
use starmap_core::StarmapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] StarmapError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot build directory client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database already exists at {}. Use --force to overwrite.", .0.display())]
    DatabaseExists(std::path::PathBuf),
}

//! Server error types

use thiserror::Error;

use sarcon_core::{ConfigError, ModelLoadError};

/// Errors that stop the server from starting or serving
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model load error: {0}")]
    ModelLoad(#[from] ModelLoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

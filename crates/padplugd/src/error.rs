use std::path::PathBuf;

use padplug_registry::ConfigError;
use thiserror::Error;

/// Error type for host commands.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to read configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("no backend selected; pass --backend or set `backend` in the configuration")]
    NoBackendSelected,
    #[error("backend \"{0}\" is not registered")]
    BackendNotFound(String),
    #[error("controller index {index} is out of range; backend \"{backend}\" supports {max}")]
    ControllerIndexOutOfRange {
        backend: &'static str,
        index: u16,
        max: u16,
    },
}

pub(crate) type Result<T> = std::result::Result<T, AppError>;

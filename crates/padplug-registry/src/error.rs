use thiserror::Error;

/// Error type for module loading.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The module itself could not be loaded.
    #[error("{0}")]
    Load(String),
    /// The module does not export a required entry point.
    #[error("Unable to locate entry point \"{name}\": {reason}")]
    MissingEntryPoint { name: &'static str, reason: String },
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml deserialize error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("plugin entry {0} is empty")]
    EmptyPluginName(usize),
}

/// Convenient result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

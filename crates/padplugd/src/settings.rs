use std::path::{Path, PathBuf};

use padplug_registry::{load_config, PluginConfig};

use crate::error::{AppError, Result};

/// Environment variable naming the configuration file.
pub(crate) const CONFIG_ENV: &str = "PADPLUG_CONFIG";

/// Configuration file looked up in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "padplug.yaml";

/// Where the configuration comes from and whether it must exist.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    /// Named on the command line or in the environment.
    Explicit(PathBuf),
    /// The default file; a missing one means no plugins.
    Default(PathBuf),
}

pub(crate) fn config_source(cli: Option<&Path>, env: Option<PathBuf>) -> ConfigSource {
    match (cli, env) {
        (Some(path), _) => ConfigSource::Explicit(path.to_path_buf()),
        (None, Some(path)) => ConfigSource::Explicit(path),
        (None, None) => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_FILE)),
    }
}

pub(crate) fn load(source: &ConfigSource) -> Result<PluginConfig> {
    let path = match source {
        ConfigSource::Explicit(path) => path,
        ConfigSource::Default(path) if !path.exists() => {
            log::debug!("{} not found, no plugins configured", path.display());
            return Ok(PluginConfig { plugin_dir: PathBuf::from("."), ..PluginConfig::default() });
        }
        ConfigSource::Default(path) => path,
    };
    load_config(path).map_err(|source| AppError::Config { path: path.clone(), source })
}

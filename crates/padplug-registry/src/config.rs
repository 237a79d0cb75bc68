use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Plugin configuration of a host process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    /// Directory relative module names are resolved against.
    pub plugin_dir: PathBuf,
    /// Module filenames in load order.
    pub plugins: Vec<String>,
    /// Backend the host uses when none is named explicitly.
    pub backend: Option<String>,
}

impl PluginConfig {
    /// Module paths in load order. Absolute names are kept as they are.
    pub fn plugin_paths(&self) -> Vec<PathBuf> {
        self.plugins.iter().map(|name| self.plugin_dir.join(name)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    #[serde(default)]
    plugin_dir: Option<PathBuf>,
    #[serde(default)]
    plugins: Vec<String>,
    #[serde(default)]
    backend: Option<String>,
}

impl ConfigV1 {
    fn into_config(self, base_dir: &Path) -> Result<PluginConfig, ConfigError> {
        if let Some(index) = self.plugins.iter().position(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyPluginName(index));
        }
        let plugin_dir = match self.plugin_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        Ok(PluginConfig {
            plugin_dir,
            plugins: self.plugins.into_iter().map(|name| name.trim().to_owned()).collect(),
            backend: self.backend,
        })
    }
}

/// Parse yaml configuration. Relative paths are resolved against `base_dir`.
pub fn parse_config(input: &str, base_dir: &Path) -> Result<PluginConfig, ConfigError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let config: ConfigV1 = serde_yaml::from_str(input)?;
            config.into_config(base_dir)
        }
        _ => Err(ConfigError::UnsupportedVersion(version)),
    }
}

fn parse_version(input: &str) -> Result<u8, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    Ok(raw.version)
}

/// Read and parse a configuration file. Relative paths inside it are
/// resolved against the directory containing the file.
pub fn load_config(path: &Path) -> Result<PluginConfig, ConfigError> {
    let input = std::fs::read_to_string(path)?;
    parse_config(&input, config_dir(path))
}

/// Directory of a config file. A bare filename has an empty parent, and
/// module names joined onto it would stay bare, sending the dynamic linker
/// to its system search path.
fn config_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

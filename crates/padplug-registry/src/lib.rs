//! Discovery and registration of padplug plugin modules.

mod config;
mod error;
mod loader;
mod registry;
mod report;

pub use crate::config::{load_config, parse_config, PluginConfig};
pub use crate::error::{ConfigError, LoaderError, Result};
pub use crate::loader::{DynamicLibraryLoader, ModuleLoader};
pub use crate::registry::{PluginRegistry, RegisteredPlugin};
pub use crate::report::{
    InterfaceOutcome, InterfaceReport, LoadReport, ModuleOutcome, ModuleReport,
};

use std::fmt;
use std::path::PathBuf;

use padplug_plugin::PluginType;

/// Record of a completed load, in the order things were attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Backends compiled into the host, registered before any module.
    pub builtins: Vec<InterfaceOutcome>,
    pub modules: Vec<ModuleReport>,
}

impl LoadReport {
    /// Number of interfaces that ended up in the registry.
    pub fn registered_count(&self) -> usize {
        let from_modules = self
            .modules
            .iter()
            .filter_map(|m| match &m.outcome {
                ModuleOutcome::Loaded(interfaces) => Some(interfaces),
                ModuleOutcome::Failed(_) => None,
            })
            .flatten()
            .filter(|i| i.outcome.is_registered())
            .count();
        let builtins = self.builtins.iter().filter(|o| o.is_registered()).count();
        builtins + from_modules
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub path: PathBuf,
    pub outcome: ModuleOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    /// The module could not be loaded or lacks an entry point.
    Failed(String),
    /// The module was loaded and kept; one entry per interface index.
    Loaded(Vec<InterfaceReport>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceReport {
    pub index: u32,
    pub outcome: InterfaceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceOutcome {
    /// The module returned a null pointer for this index.
    Null,
    /// The interface declared a type tag this host does not know.
    UnrecognizedType(u32),
    Registered { plugin_type: PluginType, name: &'static str },
    /// Another interface of the same type already holds this name.
    NameCollision { plugin_type: PluginType, name: &'static str },
    /// A built-in backend panicked while being registered.
    Panicked,
}

impl InterfaceOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, InterfaceOutcome::Registered { .. })
    }
}

impl fmt::Display for InterfaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceOutcome::Null => f.write_str("(null)"),
            InterfaceOutcome::UnrecognizedType(_) => f.write_str("(unrecognized plugin type)"),
            InterfaceOutcome::Registered { plugin_type, name } => {
                write!(f, "type = {plugin_type}, name = \"{name}\" (successfully registered)")
            }
            InterfaceOutcome::NameCollision { plugin_type, name } => write!(
                f,
                "type = {plugin_type}, name = \"{name}\" (failed to register due to a name collision)"
            ),
            InterfaceOutcome::Panicked => f.write_str("(panicked during registration)"),
        }
    }
}

use std::fmt;

/// Kinds of plugin interfaces a module can expose.
///
/// Values cross the module boundary as raw `u32`; see [`PluginType::from_raw`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginType {
    /// Implements [`crate::PhysicalControllerBackend`].
    PhysicalControllerBackend = 0,
}

impl PluginType {
    /// Number of recognized plugin types. Raw values at or above this are
    /// unrecognized.
    pub const COUNT: usize = 1;

    pub const ALL: [PluginType; Self::COUNT] = [PluginType::PhysicalControllerBackend];

    /// Validates a raw type tag received from a module.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(PluginType::PhysicalControllerBackend),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Position of this type in per-type tables.
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PluginType::PhysicalControllerBackend => "PhysicalControllerBackend",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base contract shared by every plugin interface.
pub trait Plugin: Send + Sync {
    /// Name users put in configuration files and that shows up in logs.
    /// Must stay the same for the whole process.
    fn plugin_name(&self) -> &'static str;

    /// Called before any other method. Expensive setup belongs here rather
    /// than in constructors, since every configured module is loaded but only
    /// the interfaces actually used get initialized.
    fn initialize(&self) {}
}

//! Plugin module exporting the XInput backend as `SimpleXInput`.
//!
//! Build it as a shared library and list it under `plugins` in the host
//! configuration.

use padplug_xinput::{ImportedXInput, XInputBackend};

/// Name the exported backend registers under.
pub const PLUGIN_NAME: &str = "SimpleXInput";

padplug_plugin::export_plugins!(XInputBackend::new(PLUGIN_NAME, ImportedXInput::new()));

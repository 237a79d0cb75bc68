//! XInput physical controller backend.
//!
//! [`XInputBackend`] adapts any [`XInputApi`] to the padplug backend
//! contract. [`ImportedXInput`] is the production API, imported from the
//! system library at runtime.

mod api;
mod backend;
mod import;

pub use crate::api::*;
pub use crate::backend::{XInputBackend, BUILTIN_NAME, DEVICE_PATH_MARKER};
pub use crate::import::ImportedXInput;

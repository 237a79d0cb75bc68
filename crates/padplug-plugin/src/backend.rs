use crate::plugin::Plugin;
use crate::types::{Capabilities, PhysicalState, Vibration};

/// Index of a physical controller within a backend, in
/// `0..max_physical_controller_count()`.
pub type PhysicalControllerIndex = u16;

/// Interface every physical controller backend implements.
///
/// No method reports failure by panicking: state reads carry a
/// [`DeviceStatus`](crate::DeviceStatus) and writes return `bool`. Callers
/// keep indices inside the advertised range.
pub trait PhysicalControllerBackend: Plugin {
    /// Number of controllers this backend can address. Stable for the
    /// lifetime of the backend; returning 0 disables it.
    fn max_physical_controller_count(&self) -> PhysicalControllerIndex;

    /// Whether the device identified by `guid_and_path` is handled by this
    /// backend. Devices claimed here are hidden from generic enumeration so
    /// they are not exposed twice.
    fn supports_controller_by_guid_and_path(&self, guid_and_path: &str) -> bool;

    /// Elements this backend reports. Fixed per backend.
    fn capabilities(&self) -> Capabilities;

    /// Reads the instantaneous state of one controller. Called at polling
    /// frequency; must not block on internal locks.
    fn read_input_state(&self, index: PhysicalControllerIndex) -> PhysicalState;

    /// Sends actuator magnitudes to one controller. Returns whether the
    /// device accepted them.
    fn write_force_feedback_state(
        &self,
        index: PhysicalControllerIndex,
        vibration: Vibration,
    ) -> bool;
}

/// Case-insensitive substring check used by device filters.
///
/// Device paths are ASCII in practice, so only ASCII case is folded.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

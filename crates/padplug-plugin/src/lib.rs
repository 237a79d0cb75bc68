//! Contracts shared by the padplug host and its plugin modules: the
//! physical controller data model, the backend interface and the binary
//! interface used to pass backends across module boundaries.

pub mod abi;
mod backend;
mod plugin;
mod types;

pub use padplug_bit_mask::{Bitable, Bitmask};

pub use crate::backend::{
    contains_ignore_ascii_case, PhysicalControllerBackend, PhysicalControllerIndex,
};
pub use crate::plugin::{Plugin, PluginType};
pub use crate::types::{
    Capabilities, CapabilityElement, DeviceStatus, ForceFeedbackActuator, PhysicalButton,
    PhysicalState, PhysicalStick, PhysicalTrigger, Vibration, ALL_ANALOG_STICKS,
    ALL_ANALOG_TRIGGERS, ALL_BUTTONS, ALL_FORCE_FEEDBACK_ACTUATORS, ANALOG_VALUE_MAX,
    ANALOG_VALUE_MIN, ANALOG_VALUE_NEUTRAL, STANDARD_XINPUT_BUTTONS,
    STANDARD_XINPUT_FORCE_FEEDBACK_ACTUATORS, TRIGGER_VALUE_MAX, TRIGGER_VALUE_MID,
    TRIGGER_VALUE_MIN, UNUSED_BUTTONS,
};

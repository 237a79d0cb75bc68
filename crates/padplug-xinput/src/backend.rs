use padplug_plugin::{
    contains_ignore_ascii_case, Bitmask, Capabilities, DeviceStatus, PhysicalButton,
    PhysicalControllerBackend, PhysicalControllerIndex, PhysicalState, Plugin, Vibration,
    ALL_ANALOG_STICKS, ALL_ANALOG_TRIGGERS, STANDARD_XINPUT_BUTTONS,
    STANDARD_XINPUT_FORCE_FEEDBACK_ACTUATORS, UNUSED_BUTTONS,
};

use crate::api::{
    XInputApi, XInputVibration, ERROR_DEVICE_NOT_CONNECTED, ERROR_SUCCESS,
    XINPUT_GAMEPAD_A, XINPUT_GAMEPAD_B, XINPUT_GAMEPAD_BACK, XINPUT_GAMEPAD_DPAD_DOWN,
    XINPUT_GAMEPAD_DPAD_LEFT, XINPUT_GAMEPAD_DPAD_RIGHT, XINPUT_GAMEPAD_DPAD_UP,
    XINPUT_GAMEPAD_LEFT_SHOULDER, XINPUT_GAMEPAD_LEFT_THUMB, XINPUT_GAMEPAD_RIGHT_SHOULDER,
    XINPUT_GAMEPAD_RIGHT_THUMB, XINPUT_GAMEPAD_START, XINPUT_GAMEPAD_X, XINPUT_GAMEPAD_Y,
    XUSER_MAX_COUNT,
};
use crate::import::ImportedXInput;

/// Name of the backend compiled into the host.
pub const BUILTIN_NAME: &str = "XInput (built-in)";

/// Device path fragment that marks XInput-capable devices.
pub const DEVICE_PATH_MARKER: &str = "&ig_";

/// `wButtons` bits that map onto [`PhysicalButton`] slots.
const REPORTED_BUTTONS: u16 = !UNUSED_BUTTONS.value();

// `wButtons` is copied without remapping, which needs identical layouts.
const fn bit(button: PhysicalButton) -> u16 {
    1 << button as u16
}

const _: () = {
    assert!(bit(PhysicalButton::DpadUp) == XINPUT_GAMEPAD_DPAD_UP);
    assert!(bit(PhysicalButton::DpadDown) == XINPUT_GAMEPAD_DPAD_DOWN);
    assert!(bit(PhysicalButton::DpadLeft) == XINPUT_GAMEPAD_DPAD_LEFT);
    assert!(bit(PhysicalButton::DpadRight) == XINPUT_GAMEPAD_DPAD_RIGHT);
    assert!(bit(PhysicalButton::Start) == XINPUT_GAMEPAD_START);
    assert!(bit(PhysicalButton::Back) == XINPUT_GAMEPAD_BACK);
    assert!(bit(PhysicalButton::LS) == XINPUT_GAMEPAD_LEFT_THUMB);
    assert!(bit(PhysicalButton::RS) == XINPUT_GAMEPAD_RIGHT_THUMB);
    assert!(bit(PhysicalButton::LB) == XINPUT_GAMEPAD_LEFT_SHOULDER);
    assert!(bit(PhysicalButton::RB) == XINPUT_GAMEPAD_RIGHT_SHOULDER);
    assert!(bit(PhysicalButton::A) == XINPUT_GAMEPAD_A);
    assert!(bit(PhysicalButton::B) == XINPUT_GAMEPAD_B);
    assert!(bit(PhysicalButton::X) == XINPUT_GAMEPAD_X);
    assert!(bit(PhysicalButton::Y) == XINPUT_GAMEPAD_Y);
};

/// Physical controller backend on top of XInput.
///
/// The same backend serves as the host's built-in (see [`XInputBackend::builtin`])
/// and as the backend exported by the example plugin module, under
/// different names.
pub struct XInputBackend<A = ImportedXInput> {
    name: &'static str,
    api: A,
}

impl XInputBackend<ImportedXInput> {
    /// The backend registered by the host itself.
    pub const fn builtin() -> Self {
        Self::new(BUILTIN_NAME, ImportedXInput::new())
    }
}

impl<A: XInputApi> XInputBackend<A> {
    pub const fn new(name: &'static str, api: A) -> Self {
        Self { name, api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: XInputApi> Plugin for XInputBackend<A> {
    fn plugin_name(&self) -> &'static str {
        self.name
    }

    fn initialize(&self) {
        self.api.initialize();
    }
}

impl<A: XInputApi> PhysicalControllerBackend for XInputBackend<A> {
    fn max_physical_controller_count(&self) -> PhysicalControllerIndex {
        XUSER_MAX_COUNT as PhysicalControllerIndex
    }

    fn supports_controller_by_guid_and_path(&self, guid_and_path: &str) -> bool {
        contains_ignore_ascii_case(guid_and_path, DEVICE_PATH_MARKER)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            stick: ALL_ANALOG_STICKS,
            trigger: ALL_ANALOG_TRIGGERS,
            button: STANDARD_XINPUT_BUTTONS,
            force_feedback_actuator: STANDARD_XINPUT_FORCE_FEEDBACK_ACTUATORS,
        }
    }

    fn read_input_state(&self, index: PhysicalControllerIndex) -> PhysicalState {
        match self.api.get_state(u32::from(index)) {
            Ok(native) => {
                let pad = native.gamepad;
                PhysicalState {
                    device_status: DeviceStatus::Ok,
                    stick: [pad.thumb_lx, pad.thumb_ly, pad.thumb_rx, pad.thumb_ry],
                    trigger: [pad.left_trigger, pad.right_trigger],
                    button: Bitmask::from_value(pad.buttons & REPORTED_BUTTONS),
                }
            }
            Err(ERROR_DEVICE_NOT_CONNECTED) => PhysicalState::with_status(DeviceStatus::NotConnected),
            Err(code) => {
                log::debug!("XInputGetState({index}) failed with error {code}");
                PhysicalState::with_status(DeviceStatus::Error)
            }
        }
    }

    fn write_force_feedback_state(
        &self,
        index: PhysicalControllerIndex,
        vibration: Vibration,
    ) -> bool {
        let native = XInputVibration {
            left_motor_speed: vibration.left_motor,
            right_motor_speed: vibration.right_motor,
        };
        self.api.set_state(u32::from(index), native) == ERROR_SUCCESS
    }
}

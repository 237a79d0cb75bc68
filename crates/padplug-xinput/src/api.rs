//! Types and constants of the XInput polling API.

/// Win32 error code returned by XInput calls.
pub type Win32Error = u32;

pub const ERROR_SUCCESS: Win32Error = 0;
pub const ERROR_DEVICE_NOT_CONNECTED: Win32Error = 1167;

/// Number of controllers XInput can address.
pub const XUSER_MAX_COUNT: u32 = 4;

pub const XINPUT_GAMEPAD_DPAD_UP: u16 = 0x0001;
pub const XINPUT_GAMEPAD_DPAD_DOWN: u16 = 0x0002;
pub const XINPUT_GAMEPAD_DPAD_LEFT: u16 = 0x0004;
pub const XINPUT_GAMEPAD_DPAD_RIGHT: u16 = 0x0008;
pub const XINPUT_GAMEPAD_START: u16 = 0x0010;
pub const XINPUT_GAMEPAD_BACK: u16 = 0x0020;
pub const XINPUT_GAMEPAD_LEFT_THUMB: u16 = 0x0040;
pub const XINPUT_GAMEPAD_RIGHT_THUMB: u16 = 0x0080;
pub const XINPUT_GAMEPAD_LEFT_SHOULDER: u16 = 0x0100;
pub const XINPUT_GAMEPAD_RIGHT_SHOULDER: u16 = 0x0200;
pub const XINPUT_GAMEPAD_A: u16 = 0x1000;
pub const XINPUT_GAMEPAD_B: u16 = 0x2000;
pub const XINPUT_GAMEPAD_X: u16 = 0x4000;
pub const XINPUT_GAMEPAD_Y: u16 = 0x8000;

/// `XINPUT_GAMEPAD`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XInputGamepad {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// `XINPUT_STATE`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XInputState {
    pub packet_number: u32,
    pub gamepad: XInputGamepad,
}

/// `XINPUT_VIBRATION`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XInputVibration {
    pub left_motor_speed: u16,
    pub right_motor_speed: u16,
}

/// The subset of XInput a backend needs.
pub trait XInputApi: Send + Sync {
    /// Prepares the API for use. Safe to call more than once.
    fn initialize(&self) {}

    /// `XInputGetState`: the current state, or the Win32 error code.
    fn get_state(&self, user_index: u32) -> Result<XInputState, Win32Error>;

    /// `XInputSetState`: `ERROR_SUCCESS` or the Win32 error code.
    fn set_state(&self, user_index: u32, vibration: XInputVibration) -> Win32Error;
}

const _: () = assert!(std::mem::size_of::<XInputGamepad>() == 12);
const _: () = assert!(std::mem::size_of::<XInputState>() == 16);

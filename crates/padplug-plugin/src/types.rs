use std::ops::{Index, IndexMut};

use padplug_bit_derive::Bit;
use padplug_bit_mask::{Bitable, Bitmask};

/// Maximum reading from an analog stick axis.
pub const ANALOG_VALUE_MAX: i16 = 32767;
/// Minimum reading from an analog stick axis, symmetric around zero.
pub const ANALOG_VALUE_MIN: i16 = -ANALOG_VALUE_MAX;
/// Neutral reading from an analog stick axis.
pub const ANALOG_VALUE_NEUTRAL: i16 = 0;

/// Maximum reading from an analog trigger.
pub const TRIGGER_VALUE_MAX: u8 = 255;
/// Minimum reading from an analog trigger.
pub const TRIGGER_VALUE_MIN: u8 = 0;
/// Midpoint reading for an analog trigger.
pub const TRIGGER_VALUE_MID: u8 = 127;

/// Status of a physical controller device, as reported with each state read.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceStatus {
    /// Device is connected and functioning correctly.
    Ok,
    /// Device is not connected and has not reported an error.
    #[default]
    NotConnected,
    /// Device has experienced an error.
    Error,
}

impl DeviceStatus {
    /// Validates a status byte received from another module.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(DeviceStatus::Ok),
            1 => Some(DeviceStatus::NotConnected),
            2 => Some(DeviceStatus::Error),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Analog stick axes that might be present on a physical controller.
#[repr(u8)]
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalStick {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Analog triggers that might be present on a physical controller.
#[repr(u8)]
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalTrigger {
    LT,
    RT,
}

/// Digital buttons that might be present on a physical controller.
///
/// Order matches the XInput `wButtons` layout. Guide and Share are not
/// reported by any current backend but keep their slots reserved.
#[repr(u8)]
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalButton {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Start,
    Back,
    LS,
    RS,
    LB,
    RB,
    UnusedGuide,
    UnusedShare,
    A,
    B,
    X,
    Y,
}

/// Force feedback actuators present on physical controllers.
#[repr(u8)]
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForceFeedbackActuator {
    /// Low-frequency rumble.
    LeftMotor,
    /// High-frequency rumble.
    RightMotor,
    /// Embedded in LT.
    LeftImpulseTrigger,
    /// Embedded in RT.
    RightImpulseTrigger,
}

pub const ALL_ANALOG_STICKS: Bitmask<PhysicalStick> = Bitmask::full();

pub const ALL_ANALOG_TRIGGERS: Bitmask<PhysicalTrigger> = Bitmask::full();

/// Buttons documented by the XInput API.
pub const STANDARD_XINPUT_BUTTONS: Bitmask<PhysicalButton> = Bitmask::from_indices(&[
    PhysicalButton::DpadUp as u32,
    PhysicalButton::DpadDown as u32,
    PhysicalButton::DpadLeft as u32,
    PhysicalButton::DpadRight as u32,
    PhysicalButton::Start as u32,
    PhysicalButton::Back as u32,
    PhysicalButton::LS as u32,
    PhysicalButton::RS as u32,
    PhysicalButton::LB as u32,
    PhysicalButton::RB as u32,
    PhysicalButton::A as u32,
    PhysicalButton::B as u32,
    PhysicalButton::X as u32,
    PhysicalButton::Y as u32,
]);

/// Every button slot, including the reserved ones.
pub const ALL_BUTTONS: Bitmask<PhysicalButton> = Bitmask::full();

/// Reserved button slots no backend is expected to report.
pub const UNUSED_BUTTONS: Bitmask<PhysicalButton> = Bitmask::from_indices(&[
    PhysicalButton::UnusedGuide as u32,
    PhysicalButton::UnusedShare as u32,
]);

/// Actuators documented by the XInput API.
pub const STANDARD_XINPUT_FORCE_FEEDBACK_ACTUATORS: Bitmask<ForceFeedbackActuator> =
    Bitmask::from_indices(&[
        ForceFeedbackActuator::LeftMotor as u32,
        ForceFeedbackActuator::RightMotor as u32,
    ]);

pub const ALL_FORCE_FEEDBACK_ACTUATORS: Bitmask<ForceFeedbackActuator> = Bitmask::full();

/// Which parts of [`PhysicalState`] and [`Vibration`] a backend actually
/// supports. Fixed per backend.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities {
    pub stick: Bitmask<PhysicalStick>,
    pub trigger: Bitmask<PhysicalTrigger>,
    pub button: Bitmask<PhysicalButton>,
    pub force_feedback_actuator: Bitmask<ForceFeedbackActuator>,
}

const _: () = assert!(std::mem::size_of::<Capabilities>() <= 16);

impl Capabilities {
    /// Checks whether a single element is supported.
    pub fn supports<T: CapabilityElement>(&self, element: T) -> bool {
        T::mask_in(self).contains(element)
    }
}

/// Element enums that have a collection in [`Capabilities`].
pub trait CapabilityElement: Bitable {
    fn mask_in(capabilities: &Capabilities) -> Bitmask<Self>;
}

impl CapabilityElement for PhysicalStick {
    fn mask_in(capabilities: &Capabilities) -> Bitmask<Self> {
        capabilities.stick
    }
}

impl CapabilityElement for PhysicalTrigger {
    fn mask_in(capabilities: &Capabilities) -> Bitmask<Self> {
        capabilities.trigger
    }
}

impl CapabilityElement for PhysicalButton {
    fn mask_in(capabilities: &Capabilities) -> Bitmask<Self> {
        capabilities.button
    }
}

impl CapabilityElement for ForceFeedbackActuator {
    fn mask_in(capabilities: &Capabilities) -> Bitmask<Self> {
        capabilities.force_feedback_actuator
    }
}

/// Instantaneous state of a physical controller.
///
/// Only `device_status` is meaningful unless it is [`DeviceStatus::Ok`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicalState {
    pub device_status: DeviceStatus,
    pub stick: [i16; PhysicalStick::COUNT as usize],
    pub trigger: [u8; PhysicalTrigger::COUNT as usize],
    pub button: Bitmask<PhysicalButton>,
}

const _: () = assert!(std::mem::size_of::<PhysicalState>() <= 16);

impl PhysicalState {
    /// State with the given status and a zeroed payload.
    pub const fn with_status(device_status: DeviceStatus) -> Self {
        Self {
            device_status,
            stick: [ANALOG_VALUE_NEUTRAL; PhysicalStick::COUNT as usize],
            trigger: [TRIGGER_VALUE_MIN; PhysicalTrigger::COUNT as usize],
            button: Bitmask::empty(),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.device_status == DeviceStatus::Ok
    }
}

impl Index<PhysicalStick> for PhysicalState {
    type Output = i16;

    fn index(&self, stick: PhysicalStick) -> &i16 {
        &self.stick[stick as usize]
    }
}

impl IndexMut<PhysicalStick> for PhysicalState {
    fn index_mut(&mut self, stick: PhysicalStick) -> &mut i16 {
        &mut self.stick[stick as usize]
    }
}

impl Index<PhysicalTrigger> for PhysicalState {
    type Output = u8;

    fn index(&self, trigger: PhysicalTrigger) -> &u8 {
        &self.trigger[trigger as usize]
    }
}

impl IndexMut<PhysicalTrigger> for PhysicalState {
    fn index_mut(&mut self, trigger: PhysicalTrigger) -> &mut u8 {
        &mut self.trigger[trigger as usize]
    }
}

/// Requested magnitudes for every force feedback actuator.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vibration {
    pub left_motor: u16,
    pub right_motor: u16,
    pub left_impulse_trigger: u16,
    pub right_impulse_trigger: u16,
}

impl Vibration {
    /// Magnitude requested for one actuator.
    pub fn magnitude(&self, actuator: ForceFeedbackActuator) -> u16 {
        match actuator {
            ForceFeedbackActuator::LeftMotor => self.left_motor,
            ForceFeedbackActuator::RightMotor => self.right_motor,
            ForceFeedbackActuator::LeftImpulseTrigger => self.left_impulse_trigger,
            ForceFeedbackActuator::RightImpulseTrigger => self.right_impulse_trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stay_small() {
        assert_eq!(std::mem::size_of::<Capabilities>(), 8);
        assert!(std::mem::size_of::<PhysicalState>() <= 16);
        assert_eq!(std::mem::size_of::<Vibration>(), 8);
    }

    #[test]
    fn button_positions_are_fixed() {
        assert_eq!(PhysicalButton::DpadUp.index(), 0);
        assert_eq!(PhysicalButton::RB.index(), 9);
        assert_eq!(PhysicalButton::UnusedGuide.index(), 10);
        assert_eq!(PhysicalButton::UnusedShare.index(), 11);
        assert_eq!(PhysicalButton::A.index(), 12);
        assert_eq!(PhysicalButton::Y.index(), 15);
    }

    #[test]
    fn standard_buttons_exclude_reserved_slots() {
        assert_eq!(STANDARD_XINPUT_BUTTONS.count(), 14);
        assert!(STANDARD_XINPUT_BUTTONS.intersection(&UNUSED_BUTTONS).is_empty());
        assert_eq!(STANDARD_XINPUT_BUTTONS.value() | UNUSED_BUTTONS.value(), ALL_BUTTONS.value());
    }

    #[test]
    fn predefined_capability_sets() {
        assert_eq!(ALL_ANALOG_STICKS.value(), 0b1111);
        assert_eq!(ALL_ANALOG_TRIGGERS.value(), 0b11);
        assert_eq!(STANDARD_XINPUT_FORCE_FEEDBACK_ACTUATORS.value(), 0b0011);
        assert_eq!(ALL_FORCE_FEEDBACK_ACTUATORS.value(), 0b1111);
    }

    #[test]
    fn supports_checks_the_matching_collection() {
        let caps = Capabilities {
            stick: Bitmask::new(&[PhysicalStick::LeftX]),
            trigger: Bitmask::empty(),
            button: Bitmask::new(&[PhysicalButton::A]),
            force_feedback_actuator: Bitmask::new(&[ForceFeedbackActuator::RightMotor]),
        };
        assert!(caps.supports(PhysicalStick::LeftX));
        assert!(!caps.supports(PhysicalStick::LeftY));
        assert!(!caps.supports(PhysicalTrigger::LT));
        assert!(caps.supports(PhysicalButton::A));
        assert!(!caps.supports(ForceFeedbackActuator::LeftMotor));
        assert!(caps.supports(ForceFeedbackActuator::RightMotor));
    }

    #[test]
    fn state_index_operators() {
        let mut state = PhysicalState::with_status(DeviceStatus::Ok);
        state[PhysicalStick::RightY] = ANALOG_VALUE_MIN;
        state[PhysicalTrigger::RT] = TRIGGER_VALUE_MAX;
        assert_eq!(state.stick, [0, 0, 0, -32767]);
        assert_eq!(state[PhysicalTrigger::RT], 255);
        assert_eq!(state[PhysicalTrigger::LT], 0);
        assert!(state.is_ok());
    }

    #[test]
    fn status_bytes_round_trip() {
        for status in [DeviceStatus::Ok, DeviceStatus::NotConnected, DeviceStatus::Error] {
            assert_eq!(DeviceStatus::from_raw(status.as_raw()), Some(status));
        }
        assert_eq!(DeviceStatus::from_raw(3), None);
        assert_eq!(DeviceStatus::from_raw(u8::MAX), None);
    }

    #[test]
    fn with_status_zeroes_payload() {
        let state = PhysicalState::with_status(DeviceStatus::Error);
        assert_eq!(state.device_status, DeviceStatus::Error);
        assert_eq!(state.stick, [0; 4]);
        assert_eq!(state.trigger, [0; 2]);
        assert!(state.button.is_empty());
    }

    #[test]
    fn vibration_magnitude_by_actuator() {
        let v = Vibration { left_motor: 1, right_motor: 2, left_impulse_trigger: 3, right_impulse_trigger: 4 };
        assert_eq!(v.magnitude(ForceFeedbackActuator::LeftMotor), 1);
        assert_eq!(v.magnitude(ForceFeedbackActuator::RightImpulseTrigger), 4);
    }
}

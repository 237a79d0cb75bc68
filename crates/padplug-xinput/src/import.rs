use std::sync::OnceLock;

use libloading::Library;

use crate::api::{
    Win32Error, XInputApi, XInputState, XInputVibration, ERROR_DEVICE_NOT_CONNECTED,
};

/// Libraries to try, newest first.
const LIBRARY_NAMES: &[&str] = &["xinput1_4.dll", "xinput1_3.dll", "xinput9_1_0.dll"];

type GetStateFn = unsafe extern "system" fn(u32, *mut XInputState) -> u32;
type SetStateFn = unsafe extern "system" fn(u32, *mut XInputVibration) -> u32;

struct Imported {
    get_state: GetStateFn,
    set_state: SetStateFn,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl Imported {
    fn open(name: &str) -> Result<Self, libloading::Error> {
        // SAFETY: system XInput libraries have no unusual initializers.
        let library = unsafe { Library::new(name) }?;
        // SAFETY: signatures match the documented XInput exports.
        let get_state = *unsafe { library.get::<GetStateFn>(b"XInputGetState\0") }?;
        let set_state = *unsafe { library.get::<SetStateFn>(b"XInputSetState\0") }?;
        Ok(Self { get_state, set_state, _library: library })
    }
}

/// XInput imported from the system library at runtime.
///
/// The library is loaded on [`initialize`](XInputApi::initialize) or the
/// first call, whichever comes first. Without a usable library every
/// controller reads as not connected.
#[derive(Default)]
pub struct ImportedXInput {
    imported: OnceLock<Option<Imported>>,
}

impl ImportedXInput {
    pub const fn new() -> Self {
        Self { imported: OnceLock::new() }
    }

    /// Whether a system XInput library was found.
    pub fn is_available(&self) -> bool {
        self.imported().is_some()
    }

    fn imported(&self) -> Option<&Imported> {
        self.imported.get_or_init(import_first_available).as_ref()
    }
}

fn import_first_available() -> Option<Imported> {
    for name in LIBRARY_NAMES {
        match Imported::open(name) {
            Ok(imported) => {
                log::info!("Imported XInput from {name}");
                return Some(imported);
            }
            Err(e) => log::debug!("Unable to import XInput from {name}: {e}"),
        }
    }
    log::warn!("No XInput library available; all controllers will read as disconnected");
    None
}

impl XInputApi for ImportedXInput {
    fn initialize(&self) {
        self.imported();
    }

    fn get_state(&self, user_index: u32) -> Result<XInputState, Win32Error> {
        let Some(imported) = self.imported() else {
            return Err(ERROR_DEVICE_NOT_CONNECTED);
        };
        let mut state = XInputState::default();
        // SAFETY: `state` is a valid out-parameter for the call.
        match unsafe { (imported.get_state)(user_index, &mut state) } {
            crate::api::ERROR_SUCCESS => Ok(state),
            code => Err(code),
        }
    }

    fn set_state(&self, user_index: u32, mut vibration: XInputVibration) -> Win32Error {
        let Some(imported) = self.imported() else {
            return ERROR_DEVICE_NOT_CONNECTED;
        };
        // SAFETY: XInput only reads through the pointer.
        unsafe { (imported.set_state)(user_index, &mut vibration) }
    }
}

//! Binary interface between the host and plugin modules.
//!
//! Rust trait objects have no stable layout, so everything that crosses a
//! module boundary goes through the `repr(C)` types here: a module hands out
//! [`RawPlugin`] pointers whose vtables hold `extern "C"` function pointers in
//! a fixed order. Appending methods is the only compatible way to grow a
//! vtable.
//!
//! Module side: implement [`PhysicalControllerBackend`] and list constructors
//! in [`export_plugins!`](crate::export_plugins). Host side: wrap returned
//! pointers with [`ForeignPlugin::from_raw`].

use std::borrow::Cow;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use padplug_bit_mask::{Bitable, Bitmask};

use crate::backend::{PhysicalControllerBackend, PhysicalControllerIndex};
use crate::plugin::{Plugin, PluginType};
use crate::types::{
    Capabilities, DeviceStatus, PhysicalButton, PhysicalState, PhysicalStick, PhysicalTrigger,
    Vibration,
};

/// Undecorated name of the entry point returning the interface count.
pub const INTERFACE_COUNT_ENTRY_POINT: &str = "PadplugGetInterfaceCount";

/// Undecorated name of the entry point returning one interface.
pub const INTERFACE_AT_ENTRY_POINT: &str = "PadplugGetInterfaceAt";

// 32-bit x86 Windows uses fastcall, which decorates exported names with the
// argument byte count.
#[cfg(all(windows, target_arch = "x86"))]
pub const INTERFACE_COUNT_SYMBOL: &[u8] = b"@PadplugGetInterfaceCount@0\0";
#[cfg(all(windows, target_arch = "x86"))]
pub const INTERFACE_AT_SYMBOL: &[u8] = b"@PadplugGetInterfaceAt@4\0";

#[cfg(not(all(windows, target_arch = "x86")))]
pub const INTERFACE_COUNT_SYMBOL: &[u8] = b"PadplugGetInterfaceCount\0";
#[cfg(not(all(windows, target_arch = "x86")))]
pub const INTERFACE_AT_SYMBOL: &[u8] = b"PadplugGetInterfaceAt\0";

/// Returns how many interfaces a module offers.
#[cfg(all(windows, target_arch = "x86"))]
pub type GetInterfaceCountFn = unsafe extern "fastcall" fn() -> u32;
/// Returns the interface at an index, or null if it cannot be produced.
#[cfg(all(windows, target_arch = "x86"))]
pub type GetInterfaceAtFn = unsafe extern "fastcall" fn(u32) -> *const RawPlugin;

/// Returns how many interfaces a module offers.
#[cfg(not(all(windows, target_arch = "x86")))]
pub type GetInterfaceCountFn = unsafe extern "C" fn() -> u32;
/// Returns the interface at an index, or null if it cannot be produced.
#[cfg(not(all(windows, target_arch = "x86")))]
pub type GetInterfaceAtFn = unsafe extern "C" fn(u32) -> *const RawPlugin;

/// Declares a function with the entry point calling convention.
#[macro_export]
macro_rules! entry_point {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty $body:block
    ) => {
        #[cfg(all(windows, target_arch = "x86"))]
        $(#[$meta])*
        $vis unsafe extern "fastcall" fn $name($($arg: $ty),*) -> $ret $body

        #[cfg(not(all(windows, target_arch = "x86")))]
        $(#[$meta])*
        $vis unsafe extern "C" fn $name($($arg: $ty),*) -> $ret $body
    };
}

/// Exports the module entry points for a list of backend constructors.
///
/// Each expression is evaluated once per `PadplugGetInterfaceAt` call and the
/// resulting backend is leaked to the host.
///
/// ```ignore
/// padplug_plugin::export_plugins!(MyBackend::new(), OtherBackend::default());
/// ```
#[macro_export]
macro_rules! export_plugins {
    ($($ctor:expr),+ $(,)?) => {
        $crate::entry_point! {
            #[no_mangle]
            #[allow(non_snake_case)]
            pub fn PadplugGetInterfaceCount() -> u32 {
                [$(stringify!($ctor)),+].len() as u32
            }
        }

        $crate::entry_point! {
            #[no_mangle]
            #[allow(non_snake_case)]
            pub fn PadplugGetInterfaceAt(index: u32) -> *const $crate::abi::RawPlugin {
                let constructors: &[fn() -> *const $crate::abi::RawPlugin] = &[
                    $(|| $crate::abi::RawPlugin::export_backend(|| $ctor)),+
                ];
                match constructors.get(index as usize) {
                    Some(construct) => construct(),
                    None => ::core::ptr::null(),
                }
            }
        }
    };
}

/// Borrowed UTF-8 string passed across the module boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl FfiStr {
    pub const EMPTY: FfiStr = FfiStr { ptr: std::ptr::null(), len: 0 };

    pub const fn new(s: &str) -> Self {
        Self { ptr: s.as_ptr(), len: s.len() }
    }

    /// # Safety
    ///
    /// `ptr` must be null or point to `len` readable bytes that stay valid
    /// for `'a`.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.ptr.is_null() {
            &[]
        } else {
            // SAFETY: guaranteed by the caller.
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
        }
    }
}

/// [`PhysicalState`] as it crosses the module boundary. The status stays a
/// plain byte until the host has validated it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPhysicalState {
    pub device_status: u8,
    pub stick: [i16; PhysicalStick::COUNT as usize],
    pub trigger: [u8; PhysicalTrigger::COUNT as usize],
    pub button: Bitmask<PhysicalButton>,
}

impl From<PhysicalState> for RawPhysicalState {
    fn from(state: PhysicalState) -> Self {
        Self {
            device_status: state.device_status.as_raw(),
            stick: state.stick,
            trigger: state.trigger,
            button: state.button,
        }
    }
}

impl RawPhysicalState {
    /// Converts to a [`PhysicalState`]. An unknown status byte reads as
    /// [`DeviceStatus::Error`] with an empty payload.
    pub fn validate(self) -> PhysicalState {
        match DeviceStatus::from_raw(self.device_status) {
            Some(device_status) => PhysicalState {
                device_status,
                stick: self.stick,
                trigger: self.trigger,
                button: self.button,
            },
            None => {
                log::warn!("plugin returned unknown device status {}", self.device_status);
                PhysicalState::with_status(DeviceStatus::Error)
            }
        }
    }
}

/// Base vtable every interface starts with. Field order is part of the ABI.
#[repr(C)]
pub struct PluginVTable {
    /// Raw [`PluginType`] tag; decides which extended vtable follows.
    pub plugin_type: unsafe extern "C" fn(instance: *const c_void) -> u32,
    /// UTF-8 name, valid for the rest of the process.
    pub plugin_name: unsafe extern "C" fn(instance: *const c_void) -> FfiStr,
    pub initialize: unsafe extern "C" fn(instance: *const c_void),
}

/// Vtable of a [`PluginType::PhysicalControllerBackend`] interface.
#[repr(C)]
pub struct BackendVTable {
    pub base: PluginVTable,
    pub max_physical_controller_count: unsafe extern "C" fn(instance: *const c_void) -> u16,
    pub supports_controller_by_guid_and_path:
        unsafe extern "C" fn(instance: *const c_void, guid_and_path: FfiStr) -> bool,
    pub capabilities: unsafe extern "C" fn(instance: *const c_void) -> Capabilities,
    pub read_input_state:
        unsafe extern "C" fn(instance: *const c_void, index: u16) -> RawPhysicalState,
    pub write_force_feedback_state:
        unsafe extern "C" fn(instance: *const c_void, index: u16, vibration: Vibration) -> bool,
}

/// Interface object returned by `PadplugGetInterfaceAt`.
///
/// When the type tag is [`PluginType::PhysicalControllerBackend`], `vtable`
/// points at the `base` field of a [`BackendVTable`]. Owned by the host for
/// the rest of the process and never freed by either side.
#[repr(C)]
pub struct RawPlugin {
    pub vtable: *const PluginVTable,
    pub instance: *const c_void,
}

impl RawPlugin {
    /// Leaks `backend` and returns an interface pointer for it.
    pub fn leak_backend<B: PhysicalControllerBackend + 'static>(backend: B) -> *const RawPlugin {
        let vtable: &'static BackendVTable = &BackendThunks::<B>::VTABLE;
        let instance = Box::into_raw(Box::new(backend)).cast_const().cast::<c_void>();
        let raw = Box::new(RawPlugin {
            vtable: std::ptr::from_ref(vtable).cast::<PluginVTable>(),
            instance,
        });
        Box::into_raw(raw).cast_const()
    }

    /// Constructs and leaks a backend, returning null if construction panics.
    pub fn export_backend<B, F>(construct: F) -> *const RawPlugin
    where
        B: PhysicalControllerBackend + 'static,
        F: FnOnce() -> B,
    {
        match catch_unwind(AssertUnwindSafe(construct)) {
            Ok(backend) => Self::leak_backend(backend),
            Err(_) => {
                log::error!("plugin constructor panicked");
                std::ptr::null()
            }
        }
    }
}

/// Runs a plugin method, turning a panic into `fallback` so nothing unwinds
/// through an `extern "C"` frame.
fn contain<R>(method: &str, fallback: R, f: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            log::error!("plugin method {method} panicked");
            fallback
        }
    }
}

/// Module-side `extern "C"` shims forwarding to a concrete backend.
struct BackendThunks<B>(PhantomData<B>);

impl<B: PhysicalControllerBackend + 'static> BackendThunks<B> {
    const VTABLE: BackendVTable = BackendVTable {
        base: PluginVTable {
            plugin_type: Self::plugin_type,
            plugin_name: Self::plugin_name,
            initialize: Self::initialize,
        },
        max_physical_controller_count: Self::max_physical_controller_count,
        supports_controller_by_guid_and_path: Self::supports_controller_by_guid_and_path,
        capabilities: Self::capabilities,
        read_input_state: Self::read_input_state,
        write_force_feedback_state: Self::write_force_feedback_state,
    };

    /// # Safety
    ///
    /// `instance` must come from [`RawPlugin::leak_backend::<B>`].
    unsafe fn backend<'a>(instance: *const c_void) -> &'a B {
        // SAFETY: guaranteed by the caller; leaked instances live forever.
        unsafe { &*instance.cast::<B>() }
    }

    unsafe extern "C" fn plugin_type(_instance: *const c_void) -> u32 {
        PluginType::PhysicalControllerBackend.as_raw()
    }

    unsafe extern "C" fn plugin_name(instance: *const c_void) -> FfiStr {
        contain("plugin_name", FfiStr::EMPTY, || {
            FfiStr::new(unsafe { Self::backend(instance) }.plugin_name())
        })
    }

    unsafe extern "C" fn initialize(instance: *const c_void) {
        contain("initialize", (), || unsafe { Self::backend(instance) }.initialize());
    }

    unsafe extern "C" fn max_physical_controller_count(instance: *const c_void) -> u16 {
        contain("max_physical_controller_count", 0, || {
            unsafe { Self::backend(instance) }.max_physical_controller_count()
        })
    }

    unsafe extern "C" fn supports_controller_by_guid_and_path(
        instance: *const c_void,
        guid_and_path: FfiStr,
    ) -> bool {
        contain("supports_controller_by_guid_and_path", false, || {
            // SAFETY: the host passes a string valid for the duration of the call.
            let bytes = unsafe { guid_and_path.as_bytes() };
            let guid_and_path = String::from_utf8_lossy(bytes);
            unsafe { Self::backend(instance) }.supports_controller_by_guid_and_path(&guid_and_path)
        })
    }

    unsafe extern "C" fn capabilities(instance: *const c_void) -> Capabilities {
        contain("capabilities", Capabilities::default(), || {
            unsafe { Self::backend(instance) }.capabilities()
        })
    }

    unsafe extern "C" fn read_input_state(
        instance: *const c_void,
        index: u16,
    ) -> RawPhysicalState {
        let failed = PhysicalState::with_status(DeviceStatus::Error);
        let state = contain("read_input_state", failed, || {
            unsafe { Self::backend(instance) }.read_input_state(index)
        });
        state.into()
    }

    unsafe extern "C" fn write_force_feedback_state(
        instance: *const c_void,
        index: u16,
        vibration: Vibration,
    ) -> bool {
        contain("write_force_feedback_state", false, || {
            unsafe { Self::backend(instance) }.write_force_feedback_state(index, vibration)
        })
    }
}

/// Host-side view of an interface returned by a module, before it has been
/// classified.
#[derive(Clone, Copy)]
pub struct ForeignPlugin {
    vtable: *const PluginVTable,
    instance: *const c_void,
}

impl ForeignPlugin {
    /// Wraps an interface pointer. Returns `None` for null pointers.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must point to a [`RawPlugin`] that, together with its
    /// vtable and instance, stays valid for the rest of the process and
    /// follows the layout rules documented on [`RawPlugin`].
    pub unsafe fn from_raw(raw: *const RawPlugin) -> Option<Self> {
        // SAFETY: non-null pointers are valid per the caller's contract.
        let raw = unsafe { raw.as_ref() }?;
        if raw.vtable.is_null() {
            return None;
        }
        Some(Self { vtable: raw.vtable, instance: raw.instance })
    }

    fn base(&self) -> &'static PluginVTable {
        // SAFETY: non-null and valid for the process lifetime per `from_raw`.
        unsafe { &*self.vtable }
    }

    /// Raw type tag as reported by the module.
    pub fn raw_plugin_type(&self) -> u32 {
        // SAFETY: vtable and instance are valid per `from_raw`.
        unsafe { (self.base().plugin_type)(self.instance) }
    }

    /// Recognized plugin type, or `None` if the tag is out of range.
    pub fn plugin_type(&self) -> Option<PluginType> {
        PluginType::from_raw(self.raw_plugin_type())
    }

    /// Reads the plugin name. Borrowed for the process lifetime when it is
    /// valid UTF-8, otherwise converted lossily.
    pub fn plugin_name(&self) -> Cow<'static, str> {
        // SAFETY: the contract requires the name to outlive the process.
        let bytes: &'static [u8] = unsafe { (self.base().plugin_name)(self.instance).as_bytes() };
        String::from_utf8_lossy(bytes)
    }

    /// Views this interface as a physical controller backend, if that is its
    /// declared type.
    pub fn into_backend(self) -> Option<ForeignBackend> {
        if self.plugin_type() != Some(PluginType::PhysicalControllerBackend) {
            return None;
        }
        let name = match self.plugin_name() {
            Cow::Borrowed(name) => name,
            Cow::Owned(name) => Box::leak(name.into_boxed_str()),
        };
        // SAFETY: backends point `vtable` at the start of a `BackendVTable`.
        let vtable = unsafe { &*self.vtable.cast::<BackendVTable>() };
        Some(ForeignBackend { vtable, instance: self.instance, name })
    }
}

/// A physical controller backend living in another module, called through
/// its vtable.
pub struct ForeignBackend {
    vtable: &'static BackendVTable,
    instance: *const c_void,
    name: &'static str,
}

// SAFETY: the plugin contract requires interface objects to be callable from
// any host thread.
unsafe impl Send for ForeignBackend {}
// SAFETY: see above.
unsafe impl Sync for ForeignBackend {}

impl Plugin for ForeignBackend {
    fn plugin_name(&self) -> &'static str {
        self.name
    }

    fn initialize(&self) {
        // SAFETY: vtable and instance are valid per `ForeignPlugin::from_raw`.
        unsafe { (self.vtable.base.initialize)(self.instance) }
    }
}

impl PhysicalControllerBackend for ForeignBackend {
    fn max_physical_controller_count(&self) -> PhysicalControllerIndex {
        // SAFETY: as above.
        unsafe { (self.vtable.max_physical_controller_count)(self.instance) }
    }

    fn supports_controller_by_guid_and_path(&self, guid_and_path: &str) -> bool {
        // SAFETY: as above; the string outlives the call.
        unsafe {
            (self.vtable.supports_controller_by_guid_and_path)(
                self.instance,
                FfiStr::new(guid_and_path),
            )
        }
    }

    fn capabilities(&self) -> Capabilities {
        // SAFETY: as above.
        unsafe { (self.vtable.capabilities)(self.instance) }
    }

    fn read_input_state(&self, index: PhysicalControllerIndex) -> PhysicalState {
        // SAFETY: as above.
        unsafe { (self.vtable.read_input_state)(self.instance, index) }.validate()
    }

    fn write_force_feedback_state(
        &self,
        index: PhysicalControllerIndex,
        vibration: Vibration,
    ) -> bool {
        // SAFETY: as above.
        unsafe { (self.vtable.write_force_feedback_state)(self.instance, index, vibration) }
    }
}

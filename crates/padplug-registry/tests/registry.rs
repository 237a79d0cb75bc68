use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use padplug_plugin::abi::{
    FfiStr, GetInterfaceAtFn, GetInterfaceCountFn, PluginVTable, RawPlugin,
    INTERFACE_AT_ENTRY_POINT, INTERFACE_COUNT_ENTRY_POINT,
};
use padplug_plugin::{
    Capabilities, DeviceStatus, PhysicalControllerBackend, PhysicalState, Plugin, PluginType,
    Vibration,
};
use padplug_registry::{
    InterfaceOutcome, LoaderError, ModuleLoader, ModuleOutcome, PluginRegistry, Result,
};

struct Named(&'static str);

impl Plugin for Named {
    fn plugin_name(&self) -> &'static str {
        self.0
    }
}

impl PhysicalControllerBackend for Named {
    fn max_physical_controller_count(&self) -> u16 {
        self.0.len() as u16
    }

    fn supports_controller_by_guid_and_path(&self, _: &str) -> bool {
        false
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn read_input_state(&self, _: u16) -> PhysicalState {
        PhysicalState::with_status(DeviceStatus::NotConnected)
    }

    fn write_force_feedback_state(&self, _: u16, _: Vibration) -> bool {
        false
    }
}

/// Built-in that cannot report its own name.
struct Nameless;

impl Plugin for Nameless {
    fn plugin_name(&self) -> &'static str {
        panic!("name unavailable")
    }
}

impl PhysicalControllerBackend for Nameless {
    fn max_physical_controller_count(&self) -> u16 {
        0
    }

    fn supports_controller_by_guid_and_path(&self, _: &str) -> bool {
        false
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn read_input_state(&self, _: u16) -> PhysicalState {
        PhysicalState::default()
    }

    fn write_force_feedback_state(&self, _: u16, _: Vibration) -> bool {
        false
    }
}

unsafe extern "C" fn unknown_type(_: *const c_void) -> u32 {
    PluginType::COUNT as u32 + 3
}

unsafe extern "C" fn unknown_name(_: *const c_void) -> FfiStr {
    FfiStr::new("Mystery")
}

unsafe extern "C" fn unknown_initialize(_: *const c_void) {}

static UNKNOWN_VTABLE: PluginVTable = PluginVTable {
    plugin_type: unknown_type,
    plugin_name: unknown_name,
    initialize: unknown_initialize,
};

fn unknown_plugin() -> *const RawPlugin {
    Box::into_raw(Box::new(RawPlugin { vtable: &UNKNOWN_VTABLE, instance: std::ptr::null() }))
}

// first.so: two well-formed backends.
padplug_plugin::entry_point! {
    fn first_count() -> u32 { 2 }
}
padplug_plugin::entry_point! {
    fn first_at(index: u32) -> *const RawPlugin {
        match index {
            0 => RawPlugin::leak_backend(Named("Foo")),
            1 => RawPlugin::leak_backend(Named("Dup")),
            _ => std::ptr::null(),
        }
    }
}

// second.so: one of each failure mode, then a collision and a fresh name.
padplug_plugin::entry_point! {
    fn second_count() -> u32 { 5 }
}
padplug_plugin::entry_point! {
    fn second_at(index: u32) -> *const RawPlugin {
        match index {
            1 => unknown_plugin(),
            2 => RawPlugin::leak_backend(Named("dUP")),
            3 => RawPlugin::leak_backend(Named("Bar")),
            4 => RawPlugin::export_backend::<Named, _>(|| panic!("constructor failed")),
            _ => std::ptr::null(),
        }
    }
}

#[derive(Clone, Copy)]
struct FakeModule {
    name: &'static str,
    count: Option<GetInterfaceCountFn>,
    at: Option<GetInterfaceAtFn>,
}

const FIRST: FakeModule = FakeModule { name: "first.so", count: Some(first_count), at: Some(first_at) };
const SECOND: FakeModule =
    FakeModule { name: "second.so", count: Some(second_count), at: Some(second_at) };
const NO_COUNT: FakeModule = FakeModule { name: "no_count.so", count: None, at: Some(first_at) };
const NO_AT: FakeModule = FakeModule { name: "no_at.so", count: Some(first_count), at: None };

/// Loader resolving module names against an in-memory table.
#[derive(Default)]
struct FakeLoader {
    modules: Vec<FakeModule>,
    loads: AtomicUsize,
    unloaded: Mutex<Vec<&'static str>>,
    retained: Mutex<Vec<&'static str>>,
}

impl FakeLoader {
    fn with_modules(modules: &[FakeModule]) -> Self {
        Self { modules: modules.to_vec(), ..Self::default() }
    }
}

impl ModuleLoader for FakeLoader {
    type Module = FakeModule;

    fn load(&self, path: &Path) -> Result<FakeModule> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if file_name == "panics.so" {
            panic!("loader bug");
        }
        self.modules
            .iter()
            .find(|m| m.name == file_name)
            .copied()
            .ok_or_else(|| LoaderError::Load(format!("{file_name}: cannot open shared object")))
    }

    fn resolve_interface_count(&self, module: &FakeModule) -> Result<GetInterfaceCountFn> {
        module.count.ok_or(LoaderError::MissingEntryPoint {
            name: INTERFACE_COUNT_ENTRY_POINT,
            reason: "undefined symbol".to_owned(),
        })
    }

    fn resolve_interface_at(&self, module: &FakeModule) -> Result<GetInterfaceAtFn> {
        module.at.ok_or(LoaderError::MissingEntryPoint {
            name: INTERFACE_AT_ENTRY_POINT,
            reason: "undefined symbol".to_owned(),
        })
    }

    fn unload(&self, module: FakeModule) {
        self.unloaded.lock().unwrap().push(module.name);
    }

    fn retain(&self, module: FakeModule) {
        self.retained.lock().unwrap().push(module.name);
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| Path::new("/plugins").join(n)).collect()
}

fn registry(names: &[&str]) -> PluginRegistry<FakeLoader> {
    let loader = FakeLoader::with_modules(&[FIRST, SECOND, NO_COUNT, NO_AT]);
    PluginRegistry::new(loader, paths(names))
}

#[test]
fn lookups_are_empty_before_load() {
    let registry = registry(&["first.so"]);
    assert!(!registry.is_loaded());
    assert!(registry.physical_controller_backend("Foo").is_none());
    assert!(registry.backend_names().is_empty());
    assert!(registry.load_report().is_none());
}

#[test]
fn lookup_ignores_case() {
    let registry = registry(&["first.so"]);
    registry.load_configured_plugins();
    assert!(registry.is_loaded());

    let foo = registry.physical_controller_backend("fOO").unwrap();
    assert_eq!(foo.plugin_name(), "Foo");
    assert_eq!(foo.max_physical_controller_count(), 3);
    assert!(registry.physical_controller_backend("FOO").is_some());
    assert!(registry.physical_controller_backend("Fo").is_none());
}

#[test]
fn load_is_idempotent() {
    let registry = registry(&["first.so", "second.so"]);
    registry.load_configured_plugins();
    let names = registry.backend_names();
    registry.load_configured_plugins();
    registry.load_configured_plugins();

    assert_eq!(registry.backend_names(), names);
    assert_eq!(registry.loader().loads.load(Ordering::SeqCst), 2);
}

#[test]
fn first_registration_wins_a_collision() {
    let registry = registry(&["first.so", "second.so"]);
    registry.load_configured_plugins();

    let dup = registry.physical_controller_backend("dup").unwrap();
    assert_eq!(dup.plugin_name(), "Dup");
    assert_eq!(registry.backend_names(), vec!["Bar", "Dup", "Foo"]);

    let report = registry.load_report().unwrap();
    let ModuleOutcome::Loaded(interfaces) = &report.modules[1].outcome else {
        panic!("second module should load");
    };
    assert_eq!(
        interfaces[2].outcome,
        InterfaceOutcome::NameCollision {
            plugin_type: PluginType::PhysicalControllerBackend,
            name: "dUP",
        }
    );
}

#[test]
fn bad_interfaces_are_skipped() {
    let registry = registry(&["second.so"]);
    registry.load_configured_plugins();

    let report = registry.load_report().unwrap();
    let ModuleOutcome::Loaded(interfaces) = &report.modules[0].outcome else {
        panic!("second module should load");
    };
    let outcomes: Vec<_> = interfaces.iter().map(|i| (i.index, i.outcome.clone())).collect();
    assert_eq!(
        outcomes,
        vec![
            (0, InterfaceOutcome::Null),
            (1, InterfaceOutcome::UnrecognizedType(PluginType::COUNT as u32 + 3)),
            (
                2,
                InterfaceOutcome::Registered {
                    plugin_type: PluginType::PhysicalControllerBackend,
                    name: "dUP",
                }
            ),
            (
                3,
                InterfaceOutcome::Registered {
                    plugin_type: PluginType::PhysicalControllerBackend,
                    name: "Bar",
                }
            ),
            (4, InterfaceOutcome::Null),
        ]
    );
    assert!(registry.physical_controller_backend("Mystery").is_none());
    assert_eq!(report.registered_count(), 2);
}

#[test]
fn failed_modules_do_not_stop_the_load() {
    let registry = registry(&["missing.so", "no_count.so", "no_at.so", "first.so"]);
    registry.load_configured_plugins();

    let report = registry.load_report().unwrap();
    assert_eq!(report.modules.len(), 4);
    match &report.modules[0].outcome {
        ModuleOutcome::Failed(reason) => assert!(reason.contains("missing.so")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    match &report.modules[1].outcome {
        ModuleOutcome::Failed(reason) => {
            assert!(reason.contains(INTERFACE_COUNT_ENTRY_POINT), "{reason}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    match &report.modules[2].outcome {
        ModuleOutcome::Failed(reason) => assert!(reason.contains(INTERFACE_AT_ENTRY_POINT)),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(matches!(report.modules[3].outcome, ModuleOutcome::Loaded(_)));
    assert!(registry.physical_controller_backend("Foo").is_some());

    let loader = registry.loader();
    assert_eq!(*loader.unloaded.lock().unwrap(), vec!["no_count.so", "no_at.so"]);
    assert_eq!(*loader.retained.lock().unwrap(), vec!["first.so"]);
}

#[test]
fn builtins_are_registered_before_modules() {
    let registry = registry(&["first.so"]).with_builtin(Named("FOO"));
    registry.load_configured_plugins();

    let foo = registry.physical_controller_backend("foo").unwrap();
    assert_eq!(foo.plugin_name(), "FOO");

    let report = registry.load_report().unwrap();
    assert!(report.builtins[0].is_registered());
    let ModuleOutcome::Loaded(interfaces) = &report.modules[0].outcome else {
        panic!("first module should load");
    };
    assert!(matches!(interfaces[0].outcome, InterfaceOutcome::NameCollision { name: "Foo", .. }));
}

#[test]
fn concurrent_first_calls_load_once() {
    let registry = registry(&["first.so", "second.so", "missing.so"]);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                registry.load_configured_plugins();
                assert!(registry.is_loaded());
                assert!(registry.physical_controller_backend("bar").is_some());
            });
        }
    });

    let loader = registry.loader();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 3);
    assert_eq!(loader.retained.lock().unwrap().len(), 2);
}

#[test]
fn panicking_builtin_does_not_abort_the_load() {
    let registry = registry(&["first.so"]).with_builtin(Nameless).with_builtin(Named("Baz"));
    registry.load_configured_plugins();
    assert!(registry.is_loaded());

    let report = registry.load_report().unwrap();
    assert_eq!(report.builtins[0], InterfaceOutcome::Panicked);
    assert!(report.builtins[1].is_registered());
    assert_eq!(registry.backend_names(), vec!["Baz", "Dup", "Foo"]);

    registry.load_configured_plugins();
    assert_eq!(registry.loader().loads.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_loader_fails_only_that_module() {
    let registry = registry(&["panics.so", "first.so"]);
    registry.load_configured_plugins();
    assert!(registry.is_loaded());

    let report = registry.load_report().unwrap();
    assert!(matches!(report.modules[0].outcome, ModuleOutcome::Failed(_)));
    assert!(matches!(report.modules[1].outcome, ModuleOutcome::Loaded(_)));
    assert!(registry.physical_controller_backend("foo").is_some());

    registry.load_configured_plugins();
    assert_eq!(registry.loader().loads.load(Ordering::SeqCst), 2);
}

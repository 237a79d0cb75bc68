use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use ahash::AHashMap;
use padplug_plugin::abi::{ForeignBackend, ForeignPlugin};
use padplug_plugin::{PhysicalControllerBackend, Plugin, PluginType};

use crate::loader::{DynamicLibraryLoader, ModuleLoader};
use crate::report::{InterfaceOutcome, InterfaceReport, LoadReport, ModuleOutcome, ModuleReport};

/// A registered plugin, already classified by its declared type.
#[derive(Clone, Copy)]
pub enum RegisteredPlugin {
    PhysicalControllerBackend(&'static dyn PhysicalControllerBackend),
}

impl RegisteredPlugin {
    pub fn plugin_type(&self) -> PluginType {
        match self {
            RegisteredPlugin::PhysicalControllerBackend(_) => {
                PluginType::PhysicalControllerBackend
            }
        }
    }

}

/// A registered plugin with the name it was registered under.
#[derive(Clone, Copy)]
struct Entry {
    plugin: RegisteredPlugin,
    name: &'static str,
}

/// Plugins of one type, keyed by lowercased name.
type NameMap = AHashMap<Box<str>, Entry>;

/// Everything produced by the one-time load. Never mutated afterwards.
struct LoadedPlugins {
    by_type: [NameMap; PluginType::COUNT],
    report: LoadReport,
}

impl LoadedPlugins {
    fn new() -> Self {
        Self {
            by_type: std::array::from_fn(|_| NameMap::default()),
            report: LoadReport::default(),
        }
    }

    /// Inserts unless the name is already taken within the same type. The
    /// first registration wins.
    fn register(&mut self, plugin: RegisteredPlugin, name: &'static str) -> InterfaceOutcome {
        let plugin_type = plugin.plugin_type();
        let map = &mut self.by_type[plugin_type.slot()];
        let key = normalize_name(name);
        if map.contains_key(&key) {
            return InterfaceOutcome::NameCollision { plugin_type, name };
        }
        map.insert(key, Entry { plugin, name });
        InterfaceOutcome::Registered { plugin_type, name }
    }
}

fn normalize_name(name: &str) -> Box<str> {
    name.to_lowercase().into_boxed_str()
}

/// Registry of every plugin interface found in the configured modules.
///
/// The registry starts empty. The first call to
/// [`load_configured_plugins`](Self::load_configured_plugins) populates it,
/// and after that it is read-only. Registered instances are leaked: they stay
/// valid for the rest of the process and are never dropped.
pub struct PluginRegistry<L: ModuleLoader = DynamicLibraryLoader> {
    loader: L,
    plugin_paths: Vec<PathBuf>,
    builtins: Vec<&'static dyn PhysicalControllerBackend>,
    loaded: AtomicBool,
    plugins: OnceLock<LoadedPlugins>,
}

impl PluginRegistry<DynamicLibraryLoader> {
    /// Registry that loads `plugin_paths` with the platform dynamic linker.
    pub fn with_plugin_paths(plugin_paths: Vec<PathBuf>) -> Self {
        Self::new(DynamicLibraryLoader, plugin_paths)
    }
}

impl<L: ModuleLoader> PluginRegistry<L> {
    /// Creates an unloaded registry. Modules are loaded in the given order.
    pub fn new(loader: L, plugin_paths: Vec<PathBuf>) -> Self {
        Self {
            loader,
            plugin_paths,
            builtins: Vec::new(),
            loaded: AtomicBool::new(false),
            plugins: OnceLock::new(),
        }
    }

    /// Adds a backend compiled into the host. Built-ins are registered
    /// before any module, so they win name collisions.
    pub fn with_builtin<B: PhysicalControllerBackend + 'static>(mut self, backend: B) -> Self {
        self.builtins.push(Box::leak(Box::new(backend)));
        self
    }

    /// Loads every configured module and registers its interfaces.
    ///
    /// Runs exactly once per registry, even when called concurrently; later
    /// calls return immediately. Panics raised by built-ins or the loader
    /// are caught and recorded in the report, so the load always completes.
    pub fn load_configured_plugins(&self) {
        // Skip the once-cell entirely on the hot path.
        if self.loaded.load(Ordering::Acquire) {
            return;
        }
        self.plugins.get_or_init(|| self.load_all());
        self.loaded.store(true, Ordering::Release);
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Whether the one-time load has completed.
    pub fn is_loaded(&self) -> bool {
        self.plugins.get().is_some()
    }

    /// Outcome of every module and interface seen during the load.
    pub fn load_report(&self) -> Option<&LoadReport> {
        self.plugins.get().map(|p| &p.report)
    }

    /// Looks up a plugin by type and case-insensitive name.
    pub fn plugin(&self, plugin_type: PluginType, name: &str) -> Option<RegisteredPlugin> {
        let plugins = self.plugins.get()?;
        let entry = plugins.by_type[plugin_type.slot()].get(&*normalize_name(name))?;
        Some(entry.plugin)
    }

    /// Looks up a physical controller backend by case-insensitive name.
    /// Returns `None` before the load or when no backend has that name.
    pub fn physical_controller_backend(
        &self,
        name: &str,
    ) -> Option<&'static dyn PhysicalControllerBackend> {
        match self.plugin(PluginType::PhysicalControllerBackend, name)? {
            RegisteredPlugin::PhysicalControllerBackend(backend) => Some(backend),
        }
    }

    /// Names of all registered backends as the plugins spell them, sorted
    /// case-insensitively.
    pub fn backend_names(&self) -> Vec<&'static str> {
        let Some(plugins) = self.plugins.get() else {
            return Vec::new();
        };
        let map = &plugins.by_type[PluginType::PhysicalControllerBackend.slot()];
        let mut names: Vec<_> = map.iter().map(|(key, entry)| (key, entry.name)).collect();
        names.sort_unstable_by(|a, b| a.0.cmp(b.0));
        names.into_iter().map(|(_, name)| name).collect()
    }

    fn load_all(&self) -> LoadedPlugins {
        let mut plugins = LoadedPlugins::new();

        for &backend in &self.builtins {
            let outcome = match catch_unwind(AssertUnwindSafe(|| backend.plugin_name())) {
                Ok(name) => {
                    plugins.register(RegisteredPlugin::PhysicalControllerBackend(backend), name)
                }
                Err(_) => InterfaceOutcome::Panicked,
            };
            log::info!("  built-in: {outcome}");
            plugins.report.builtins.push(outcome);
        }

        for path in &self.plugin_paths {
            let load = AssertUnwindSafe(|| self.load_single_module(path, &mut plugins));
            let report = catch_unwind(load).unwrap_or_else(|_| {
                log::error!("Loading plugin \"{}\" panicked", path.display());
                ModuleReport {
                    path: path.to_owned(),
                    outcome: ModuleOutcome::Failed("panicked while loading".to_owned()),
                }
            });
            plugins.report.modules.push(report);
        }

        plugins
    }

    fn load_single_module(&self, path: &Path, plugins: &mut LoadedPlugins) -> ModuleReport {
        let failed = |reason: String| ModuleReport {
            path: path.to_owned(),
            outcome: ModuleOutcome::Failed(reason),
        };

        let module = match self.loader.load(path) {
            Ok(module) => module,
            Err(e) => {
                log::info!("Failed to load plugin \"{}\": {e}", path.display());
                return failed(e.to_string());
            }
        };

        let get_count = match self.loader.resolve_interface_count(&module) {
            Ok(f) => f,
            Err(e) => {
                log::info!("Failed to load plugin \"{}\": {e}", path.display());
                self.loader.unload(module);
                return failed(e.to_string());
            }
        };

        let get_interface = match self.loader.resolve_interface_at(&module) {
            Ok(f) => f,
            Err(e) => {
                log::info!("Failed to load plugin \"{}\": {e}", path.display());
                self.loader.unload(module);
                return failed(e.to_string());
            }
        };

        // Interfaces point into the module, so it must never be unloaded now.
        self.loader.retain(module);
        log::info!("Successfully loaded plugin: \"{}\"", path.display());

        // SAFETY: entry points resolved from a module following the plugin ABI.
        let count = unsafe { get_count() };
        let mut interfaces = Vec::new();

        for index in 0..count {
            // SAFETY: as above; `index` is within the advertised count.
            let raw = unsafe { get_interface(index) };
            // SAFETY: returned pointers are owned by the host for the rest of
            // the process per the plugin ABI.
            let Some(foreign) = (unsafe { ForeignPlugin::from_raw(raw) }) else {
                let outcome = InterfaceOutcome::Null;
                log::info!("  [{index}]: {outcome}");
                interfaces.push(InterfaceReport { index, outcome });
                continue;
            };

            let plugin = match foreign.plugin_type() {
                Some(PluginType::PhysicalControllerBackend) => {
                    foreign.into_backend().map(|backend| {
                        let backend: &'static ForeignBackend = Box::leak(Box::new(backend));
                        (RegisteredPlugin::PhysicalControllerBackend(backend), backend.plugin_name())
                    })
                }
                None => None,
            };
            let Some((plugin, name)) = plugin else {
                let outcome = InterfaceOutcome::UnrecognizedType(foreign.raw_plugin_type());
                log::info!("  [{index}]: {outcome}");
                interfaces.push(InterfaceReport { index, outcome });
                continue;
            };

            let outcome = plugins.register(plugin, name);
            log::info!("  [{index}]: {outcome}");
            interfaces.push(InterfaceReport { index, outcome });
        }

        ModuleReport { path: path.to_owned(), outcome: ModuleOutcome::Loaded(interfaces) }
    }
}

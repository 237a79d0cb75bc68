use std::path::Path;

use libloading::Library;
use padplug_plugin::abi::{
    GetInterfaceAtFn, GetInterfaceCountFn, INTERFACE_AT_ENTRY_POINT, INTERFACE_AT_SYMBOL,
    INTERFACE_COUNT_ENTRY_POINT, INTERFACE_COUNT_SYMBOL,
};

use crate::error::{LoaderError, Result};

/// Loads plugin modules and resolves their entry points.
///
/// This is the only place the registry touches the platform loader, so tests
/// can substitute modules built from plain function pointers.
pub trait ModuleLoader: Send + Sync {
    /// Handle to a loaded module.
    type Module;

    fn load(&self, path: &Path) -> Result<Self::Module>;

    fn resolve_interface_count(&self, module: &Self::Module) -> Result<GetInterfaceCountFn>;

    fn resolve_interface_at(&self, module: &Self::Module) -> Result<GetInterfaceAtFn>;

    /// Releases a module that turned out to be unusable.
    fn unload(&self, module: Self::Module);

    /// Keeps a module mapped for the rest of the process. Interfaces it
    /// handed out stay valid only as long as the module does.
    fn retain(&self, module: Self::Module);
}

/// [`ModuleLoader`] backed by the platform dynamic linker.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLibraryLoader;

impl ModuleLoader for DynamicLibraryLoader {
    type Module = Library;

    fn load(&self, path: &Path) -> Result<Library> {
        // SAFETY: loading runs the module's initializers. Modules come from
        // the user's configuration and are trusted to follow the plugin ABI.
        unsafe { Library::new(path) }.map_err(|e| LoaderError::Load(e.to_string()))
    }

    fn resolve_interface_count(&self, module: &Library) -> Result<GetInterfaceCountFn> {
        // SAFETY: the symbol type is fixed by the plugin ABI.
        let symbol = unsafe { module.get::<GetInterfaceCountFn>(INTERFACE_COUNT_SYMBOL) }
            .map_err(|e| LoaderError::MissingEntryPoint {
                name: INTERFACE_COUNT_ENTRY_POINT,
                reason: e.to_string(),
            })?;
        Ok(*symbol)
    }

    fn resolve_interface_at(&self, module: &Library) -> Result<GetInterfaceAtFn> {
        // SAFETY: the symbol type is fixed by the plugin ABI.
        let symbol = unsafe { module.get::<GetInterfaceAtFn>(INTERFACE_AT_SYMBOL) }.map_err(
            |e| LoaderError::MissingEntryPoint {
                name: INTERFACE_AT_ENTRY_POINT,
                reason: e.to_string(),
            },
        )?;
        Ok(*symbol)
    }

    fn unload(&self, module: Library) {
        if let Err(e) = module.close() {
            log::warn!("Failed to unload plugin module: {e}");
        }
    }

    fn retain(&self, module: Library) {
        std::mem::forget(module);
    }
}

use std::fmt::Write as _;
use std::time::Duration;

use colored::Colorize;
use crossbeam_channel::{select, tick};
use padplug_plugin::{
    Capabilities, DeviceStatus, PhysicalControllerBackend, PhysicalState, PhysicalStick,
    PhysicalTrigger, Vibration,
};
use padplug_registry::{ModuleOutcome, ModuleLoader, PluginConfig, PluginRegistry};
use padplug_xinput::XInputBackend;

use crate::error::{AppError, Result};
use crate::{print_debug, print_info, print_warning};

/// A loaded registry plus the backend to use when none is named.
pub(crate) struct Host<L: ModuleLoader> {
    registry: PluginRegistry<L>,
    default_backend: Option<String>,
}

impl Host<padplug_registry::DynamicLibraryLoader> {
    /// Registers the built-in XInput backend, then loads configured modules.
    pub(crate) fn from_config(config: PluginConfig) -> Self {
        let registry = PluginRegistry::with_plugin_paths(config.plugin_paths())
            .with_builtin(XInputBackend::builtin());
        Self::new(registry, config.backend)
    }
}

impl<L: ModuleLoader> Host<L> {
    pub(crate) fn new(registry: PluginRegistry<L>, default_backend: Option<String>) -> Self {
        registry.load_configured_plugins();
        Self { registry, default_backend }
    }

    fn backend(&self, requested: Option<&str>) -> Result<&'static dyn PhysicalControllerBackend> {
        let name = requested
            .or(self.default_backend.as_deref())
            .ok_or(AppError::NoBackendSelected)?;
        self.registry
            .physical_controller_backend(name)
            .ok_or_else(|| AppError::BackendNotFound(name.to_owned()))
    }

    /// Resolves and initializes a backend, checking the controller index.
    fn controller(
        &self,
        requested: Option<&str>,
        index: u16,
    ) -> Result<&'static dyn PhysicalControllerBackend> {
        let backend = self.backend(requested)?;
        let max = backend.max_physical_controller_count();
        if index >= max {
            return Err(AppError::ControllerIndexOutOfRange {
                backend: backend.plugin_name(),
                index,
                max,
            });
        }
        backend.initialize();
        Ok(backend)
    }

    pub(crate) fn list(&self) {
        if let Some(report) = self.registry.load_report() {
            for module in &report.modules {
                if let ModuleOutcome::Failed(reason) = &module.outcome {
                    print_warning!("skipped {}: {reason}", module.path.display());
                }
            }
        }

        let names = self.registry.backend_names();
        print_info!("{} backend(s) registered", names.len());
        for name in names {
            let Some(backend) = self.registry.physical_controller_backend(name) else {
                continue;
            };
            print_info!(
                "  {}: {} controller(s), {}",
                name.bold(),
                backend.max_physical_controller_count(),
                describe_capabilities(&backend.capabilities())
            );
        }
    }

    pub(crate) fn poll(&self, requested: Option<&str>, index: u16, interval: Duration) -> Result<()> {
        let backend = self.controller(requested, index)?;

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })
        .expect("failed to set Ctrl+C handler");

        let ticker = tick(interval);
        print_info!("polling {} [{index}], press Ctrl+C to stop", backend.plugin_name());
        let mut last: Option<PhysicalState> = None;
        loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    let state = backend.read_input_state(index);
                    if last != Some(state) {
                        print_info!("[{index}] {}", describe_state(&state));
                        last = Some(state);
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn rumble(
        &self,
        requested: Option<&str>,
        index: u16,
        vibration: Vibration,
        duration: Duration,
    ) -> Result<()> {
        let backend = self.controller(requested, index)?;
        if !backend.write_force_feedback_state(index, vibration) {
            print_warning!("{} [{index}] rejected the vibration", backend.plugin_name());
            return Ok(());
        }
        print_debug!("vibrating for {}ms", duration.as_millis());
        std::thread::sleep(duration);
        backend.write_force_feedback_state(index, Vibration::default());
        Ok(())
    }

    /// Evaluates the device filter. Returns whether the backend claims it.
    pub(crate) fn filter(&self, requested: Option<&str>, guid_and_path: &str) -> Result<bool> {
        let backend = self.backend(requested)?;
        let supported = backend.supports_controller_by_guid_and_path(guid_and_path);
        let verdict = if supported { "supported" } else { "not supported" };
        print_info!("{}: {verdict}", backend.plugin_name());
        Ok(supported)
    }
}

pub(crate) fn describe_state(state: &PhysicalState) -> String {
    match state.device_status {
        DeviceStatus::NotConnected => return "not connected".to_owned(),
        DeviceStatus::Error => return "error".to_owned(),
        DeviceStatus::Ok => {}
    }
    let mut out = format!(
        "LX={} LY={} RX={} RY={} LT={} RT={} buttons=[",
        state[PhysicalStick::LeftX],
        state[PhysicalStick::LeftY],
        state[PhysicalStick::RightX],
        state[PhysicalStick::RightY],
        state[PhysicalTrigger::LT],
        state[PhysicalTrigger::RT],
    );
    for (i, button) in state.button.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{button:?}");
    }
    out.push(']');
    out
}

pub(crate) fn describe_capabilities(caps: &Capabilities) -> String {
    format!(
        "sticks {:?}, triggers {:?}, {} button(s), actuators {:?}",
        caps.stick,
        caps.trigger,
        caps.button.count(),
        caps.force_feedback_actuator
    )
}

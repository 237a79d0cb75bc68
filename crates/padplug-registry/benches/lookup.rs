use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padplug_plugin::abi::{ForeignPlugin, RawPlugin};
use padplug_plugin::{
    Capabilities, DeviceStatus, PhysicalControllerBackend, PhysicalState, PhysicalStick, Plugin,
    Vibration, ALL_ANALOG_STICKS,
};
use padplug_registry::PluginRegistry;

struct Steady(&'static str);

impl Plugin for Steady {
    fn plugin_name(&self) -> &'static str {
        self.0
    }
}

impl PhysicalControllerBackend for Steady {
    fn max_physical_controller_count(&self) -> u16 {
        4
    }

    fn supports_controller_by_guid_and_path(&self, guid_and_path: &str) -> bool {
        padplug_plugin::contains_ignore_ascii_case(guid_and_path, "&ig_")
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { stick: ALL_ANALOG_STICKS, ..Capabilities::default() }
    }

    fn read_input_state(&self, index: u16) -> PhysicalState {
        let mut state = PhysicalState::with_status(DeviceStatus::Ok);
        state[PhysicalStick::LeftX] = index as i16;
        state
    }

    fn write_force_feedback_state(&self, _: u16, _: Vibration) -> bool {
        true
    }
}

pub fn bench_lookup(c: &mut Criterion) {
    let names = ["XInput (built-in)", "SimpleXInput", "DualSense", "Joy-Con", "Stadia"];
    let mut registry = PluginRegistry::with_plugin_paths(Vec::new());
    for name in names {
        registry = registry.with_builtin(Steady(name));
    }
    registry.load_configured_plugins();

    c.bench_function("registry_lookup_mixed_case", |b| {
        b.iter(|| {
            let backend = registry.physical_controller_backend(black_box("simplexinput"));
            black_box(backend.is_some())
        })
    });

    c.bench_function("registry_load_fast_path", |b| {
        b.iter(|| registry.load_configured_plugins())
    });
}

pub fn bench_read_state(c: &mut Criterion) {
    let native = Steady("native");
    let raw = RawPlugin::leak_backend(Steady("foreign"));
    let Some(foreign) = (unsafe { ForeignPlugin::from_raw(raw) }).and_then(|p| p.into_backend())
    else {
        return;
    };

    c.bench_function("read_state_native", |b| {
        b.iter(|| black_box(native.read_input_state(black_box(1))))
    });

    c.bench_function("read_state_through_abi", |b| {
        b.iter(|| black_box(foreign.read_input_state(black_box(1))))
    });
}

criterion_group!(benches, bench_lookup, bench_read_state);
criterion_main!(benches);

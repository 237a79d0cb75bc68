mod cli;
mod error;
mod host;
mod logging;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use padplug_plugin::Vibration;

use crate::cli::{Cli, Command};
use crate::error::Result;
use crate::host::Host;

fn run(cli: Cli) -> Result<()> {
    let env_config = std::env::var_os(settings::CONFIG_ENV).map(PathBuf::from);
    let source = settings::config_source(cli.config.as_deref(), env_config);
    let config = settings::load(&source)?;
    print_debug!("configuration: {source:?}");

    let host = Host::from_config(config);
    match cli.command {
        Command::List => host.list(),
        Command::Poll { backend, index, interval_ms } => {
            host.poll(backend.as_deref(), index, Duration::from_millis(interval_ms))?;
        }
        Command::Rumble { backend, index, left, right, ms } => {
            let vibration = Vibration { left_motor: left, right_motor: right, ..Vibration::default() };
            host.rumble(backend.as_deref(), index, vibration, Duration::from_millis(ms))?;
        }
        Command::Filter { backend, guid_and_path } => {
            host.filter(backend.as_deref(), &guid_and_path)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}

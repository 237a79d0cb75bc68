use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// List registered backends and their capabilities.
    List,
    /// Print state changes of one controller until interrupted.
    Poll {
        /// Backend name (case-insensitive). Defaults to the configured backend
        #[arg(short, long)]
        backend: Option<String>,
        /// Controller index within the backend
        #[arg(short, long, default_value_t = 0)]
        index: u16,
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 16)]
        interval_ms: u64,
    },
    /// Run the vibration motors of one controller for a while.
    Rumble {
        /// Backend name (case-insensitive). Defaults to the configured backend
        #[arg(short, long)]
        backend: Option<String>,
        /// Controller index within the backend
        #[arg(short, long, default_value_t = 0)]
        index: u16,
        /// Left (low-frequency) motor magnitude
        #[arg(long, default_value_t = 0)]
        left: u16,
        /// Right (high-frequency) motor magnitude
        #[arg(long, default_value_t = 0)]
        right: u16,
        /// How long to vibrate, in milliseconds
        #[arg(long, default_value_t = 500)]
        ms: u64,
    },
    /// Check whether a backend claims a device.
    Filter {
        /// Backend name (case-insensitive). Defaults to the configured backend
        #[arg(short, long)]
        backend: Option<String>,
        /// Combined device GUID and path
        guid_and_path: String,
    },
}

/// Loads physical controller backend plugins and talks to controllers
/// through them.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Configuration file. Defaults to $PADPLUG_CONFIG, then ./padplug.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}

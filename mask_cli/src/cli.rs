//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "maskctl", version, about = "Mask indexing controller CLI")]
pub struct Cli {
    /// Path to config TOML; defaults are used when the file is absent
    #[arg(long, value_name = "FILE", default_value = "etc/mask_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to the
    /// config [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Direction preference for rotate commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DirectionArg {
    Auto,
    Forward,
    Reverse,
    None,
}

impl From<DirectionArg> for mask_core::Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Auto => mask_core::Direction::Auto,
            DirectionArg::Forward => mask_core::Direction::Forward,
            DirectionArg::Reverse => mask_core::Direction::Reverse,
            DirectionArg::None => mask_core::Direction::None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate the Hall reference and re-anchor the mask zero
    Index {
        /// Override the indexing timeout in ms (takes precedence over config)
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },
    /// Rotate the mask to an absolute angle and wait for arrival
    Rotate {
        /// Target angle in mask degrees
        #[arg(long, allow_hyphen_values = true)]
        degrees: f32,
        /// Preferred direction of motion
        #[arg(long, value_enum, default_value_t = DirectionArg::Auto)]
        direction: DirectionArg,
    },
}

//! maskctl entry point: config loading, tracing setup, signal handling, and
//! command dispatch.

mod cli;
mod run;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::WrapErr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        mask_config::load_config(&cli.config)?
    } else {
        mask_config::Config::default()
    };

    init_tracing(&cli, &config.logging)?;
    if !cli.config.exists() {
        tracing::info!(config = %cli.config.display(), "config file absent; using defaults");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .wrap_err("installing ctrl-c handler")?;

    let code = match cli.cmd {
        Commands::Index { timeout_ms } => {
            let (motor, sensor) = run::build_rig(&config)?;
            run::run_index(motor, sensor, &config, timeout_ms, &shutdown, cli.json)?
        }
        Commands::Rotate { degrees, direction } => {
            let (motor, _sensor) = run::build_rig(&config)?;
            run::run_rotate(motor, &config, degrees, direction.into(), &shutdown, cli.json)?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Console logging goes to stderr so JSON results on stdout stay parseable;
/// an optional file sink is added per the `[logging]` config table.
fn init_tracing(cli: &Cli, logging: &mask_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(file) => {
            let path = std::path::Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "maskctl.log".into());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = cli::FILE_GUARD.set(guard);
            if cli.json {
                registry
                    .with(fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                registry.with(fmt::layer().with_writer(writer)).init();
            }
        }
        None => {
            if cli.json {
                registry
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            } else {
                registry
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .init();
            }
        }
    }
    Ok(())
}

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and validation for the mask controller.
//!
//! `Config` and its sub-structs deserialize from TOML; every table has
//! defaults so a missing file or a partial file still produces a runnable
//! configuration, and `validate()` enforces the physical invariants before
//! anything is built from it.

use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;

/// Motor geometry and tick pacing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Motor {
    /// Whole steps per full motor rotation. Must be positive.
    pub steps_per_rotation: i32,
    /// Rate the stepper tick runs at [Hz]. Must be in 1..=1000.
    pub tick_rate_hz: u32,
}

impl Default for Motor {
    fn default() -> Self {
        Self {
            steps_per_rotation: 200,
            tick_rate_hz: 125,
        }
    }
}

/// Motor-to-mask coupling.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Mask {
    /// Motor rotations per mask rotation; negative for reversed mounting.
    /// Must be finite and non-zero.
    pub gear_ratio: f32,
}

impl Default for Mask {
    fn default() -> Self {
        Self { gear_ratio: 1.0 }
    }
}

/// Calibration pass limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Indexing {
    /// Fail an index pass if no sensor transition is seen within this bound
    /// [ms]. Must be positive.
    pub timeout_ms: u64,
}

impl Default for Indexing {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

/// GPIO pin assignments; only consulted by hardware builds.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Pins {
    pub motor_step: Option<u8>,
    pub motor_dir: Option<u8>,
    pub hall_power: Option<u8>,
    pub hall_state: Option<u8>,
}

/// Log sink configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    /// Path to a log file; console-only when absent.
    pub file: Option<String>,
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub motor: Motor,
    pub mask: Mask,
    pub indexing: Indexing,
    pub pins: Pins,
    pub logging: Logging,
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> eyre::Result<Self> {
        let cfg: Config = toml::from_str(text).wrap_err("parsing config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Enforces the physical invariants the motion stack is built on.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.motor.steps_per_rotation <= 0 {
            eyre::bail!("motor.steps_per_rotation must be positive");
        }
        if !(1..=1000).contains(&self.motor.tick_rate_hz) {
            eyre::bail!("motor.tick_rate_hz must be in 1..=1000");
        }
        if !self.mask.gear_ratio.is_finite() || self.mask.gear_ratio == 0.0 {
            eyre::bail!("mask.gear_ratio must be finite and non-zero");
        }
        if self.indexing.timeout_ms == 0 {
            eyre::bail!("indexing.timeout_ms must be positive");
        }
        Ok(())
    }
}

/// Reads and validates the config file at `path`.
pub fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config {}", path.display()))?;
    Config::from_toml_str(&text)
}

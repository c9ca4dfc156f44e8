//! Runtime configuration for the motion stack.
//!
//! These are the structs the controllers are built from. They are separate
//! from the TOML-deserialized schema in `mask_config`; the `From` impls
//! below bridge the two so the CLI does no field-by-field mapping.

use crate::index::DEFAULT_INDEX_TIMEOUT_MS;

/// Motor geometry and tick pacing.
#[derive(Debug, Clone)]
pub struct MotionCfg {
    /// Whole steps per full motor rotation. Invariant: > 0.
    pub steps_per_rotation: i32,
    /// Fixed rate the host drives `update()` at [Hz].
    pub tick_rate_hz: u32,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            steps_per_rotation: 200,
            tick_rate_hz: 125,
        }
    }
}

/// Coupling between motor and mask.
#[derive(Debug, Clone)]
pub struct GearingCfg {
    /// Motor rotations per mask rotation; the sign encodes reversed
    /// mounting. Invariant: finite and non-zero.
    pub gear_ratio: f32,
}

impl Default for GearingCfg {
    fn default() -> Self {
        Self { gear_ratio: 1.0 }
    }
}

/// Calibration pass limits.
#[derive(Debug, Clone)]
pub struct IndexingCfg {
    /// Bound on the time between state-advancing events [ms].
    pub timeout_ms: u64,
}

impl Default for IndexingCfg {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_INDEX_TIMEOUT_MS,
        }
    }
}

// ── Bridges from the TOML schema ─────────────────────────────────────────────

impl From<&mask_config::Motor> for MotionCfg {
    fn from(c: &mask_config::Motor) -> Self {
        Self {
            steps_per_rotation: c.steps_per_rotation,
            tick_rate_hz: c.tick_rate_hz,
        }
    }
}

impl From<&mask_config::Mask> for GearingCfg {
    fn from(c: &mask_config::Mask) -> Self {
        Self {
            gear_ratio: c.gear_ratio,
        }
    }
}

impl From<&mask_config::Indexing> for IndexingCfg {
    fn from(c: &mask_config::Indexing) -> Self {
        Self {
            timeout_ms: c.timeout_ms,
        }
    }
}

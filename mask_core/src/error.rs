use thiserror::Error;

/// Construction-time validation failures.
///
/// Runtime failures never surface as errors: the control core absorbs them
/// into state (see `IndexState::CannotIndex`) and logs, so a headless unit
/// keeps running without an operator console.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("steps per rotation must be positive")]
    InvalidStepsPerRotation,
    #[error("gear ratio must be finite and non-zero")]
    InvalidGearRatio,
    #[error("index timeout must be positive")]
    InvalidTimeout,
}

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Single-step actuation seam for a stepper driver.
///
/// Implementations execute exactly one physical step per call and must be
/// safe to invoke at the controller tick rate (~125 Hz). The controller
/// assumes the driver is already initialized and energized.
pub trait Motor {
    fn step_forward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn step_backward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Power-gated Hall-effect proximity switch.
///
/// Invariant all implementations must uphold: while unpowered,
/// `is_triggered()` reports `Ok(false)`. An unenergized switch cannot
/// trigger.
pub trait HallSensor {
    fn set_power(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn is_triggered(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

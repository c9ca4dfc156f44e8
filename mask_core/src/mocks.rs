//! Test and helper mocks for mask_core.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use mask_traits::{HallSensor, Motor};

/// Motor that adjusts a shared signed step counter; never fails.
#[derive(Default)]
pub struct CountingMotor {
    steps: Arc<AtomicI32>,
}

impl CountingMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the counter for assertions while the motor is owned by a
    /// controller.
    pub fn counter(&self) -> Arc<AtomicI32> {
        self.steps.clone()
    }
}

impl Motor for CountingMotor {
    fn step_forward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.steps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn step_backward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.steps.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Motor whose steps always fail; exercises driver-failure paths.
pub struct FaultyMotor;

impl Motor for FaultyMotor {
    fn step_forward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("faulty motor")))
    }

    fn step_backward(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("faulty motor")))
    }
}

/// Sensor that never triggers while powered; drives timeout paths.
#[derive(Default)]
pub struct QuietSensor {
    powered: bool,
}

impl QuietSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }
}

impl HallSensor for QuietSensor {
    fn set_power(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.powered = on;
        Ok(())
    }

    fn is_triggered(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(false)
    }
}

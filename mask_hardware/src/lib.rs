//! Hardware backends for the mask controller: a simulation rig for hosted
//! runs and tests, and Raspberry Pi GPIO implementations behind the
//! `hardware` feature.

pub mod error;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use mask_traits::{HallSensor, Motor};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Simulated stepper: adjusts a shared step counter, never fails.
pub struct SimulatedStepper {
    position: Arc<AtomicI32>,
}

impl SimulatedStepper {
    pub fn new() -> Self {
        Self {
            position: Arc::new(AtomicI32::new(0)),
        }
    }

    /// Handle to the shared step counter (also consumed by
    /// `SimulatedHallSwitch` to derive the mask angle).
    pub fn position_handle(&self) -> Arc<AtomicI32> {
        self.position.clone()
    }
}

impl Default for SimulatedStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Motor for SimulatedStepper {
    fn step_forward(&mut self) -> Result<(), BoxError> {
        self.position.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn step_backward(&mut self) -> Result<(), BoxError> {
        self.position.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Simulated Hall switch triggered while the mask angle sits inside a fixed
/// angular window.
///
/// The window is given in wrapped mask degrees and may cross 0 (a window of
/// (350, 10) spans twenty degrees around zero). Honors the trait invariant:
/// unpowered reads are `Ok(false)`.
pub struct SimulatedHallSwitch {
    position: Arc<AtomicI32>,
    steps_per_rotation: i32,
    gear_ratio: f32,
    window_low_deg: f32,
    window_high_deg: f32,
    powered: bool,
}

impl SimulatedHallSwitch {
    pub fn new(
        position: Arc<AtomicI32>,
        steps_per_rotation: i32,
        gear_ratio: f32,
        window_low_deg: f32,
        window_high_deg: f32,
    ) -> Self {
        Self {
            position,
            steps_per_rotation,
            gear_ratio,
            window_low_deg: window_low_deg.rem_euclid(360.0),
            window_high_deg: window_high_deg.rem_euclid(360.0),
            powered: false,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    fn mask_angle_deg(&self) -> f32 {
        let steps = self.position.load(Ordering::Relaxed);
        let motor_deg = 360.0 * steps as f32 / self.steps_per_rotation as f32;
        (motor_deg / self.gear_ratio).rem_euclid(360.0)
    }
}

impl HallSensor for SimulatedHallSwitch {
    fn set_power(&mut self, on: bool) -> Result<(), BoxError> {
        self.powered = on;
        tracing::debug!(on, "simulated hall switch power");
        Ok(())
    }

    fn is_triggered(&mut self) -> Result<bool, BoxError> {
        if !self.powered {
            return Ok(false);
        }
        let angle = self.mask_angle_deg();
        let (lo, hi) = (self.window_low_deg, self.window_high_deg);
        let inside = if lo <= hi {
            angle >= lo && angle < hi
        } else {
            angle >= lo || angle < hi
        };
        Ok(inside)
    }
}

/// Builds a stepper/hall pair sharing one step counter, with the trigger
/// window expressed in wrapped mask degrees.
pub fn simulated_rig(
    steps_per_rotation: i32,
    gear_ratio: f32,
    window_low_deg: f32,
    window_high_deg: f32,
) -> (SimulatedStepper, SimulatedHallSwitch) {
    let stepper = SimulatedStepper::new();
    let hall = SimulatedHallSwitch::new(
        stepper.position_handle(),
        steps_per_rotation,
        gear_ratio,
        window_low_deg,
        window_high_deg,
    );
    (stepper, hall)
}

#[cfg(feature = "hardware")]
mod gpio {
    use super::BoxError;
    use crate::error::HwError;
    use mask_traits::{HallSensor, Motor};
    use rppal::gpio::{Gpio, InputPin, OutputPin};
    use std::thread::sleep;
    use std::time::Duration;

    /// STEP/DIR pulse driver for a stepper power stage.
    pub struct GpioStepper {
        step: OutputPin,
        dir: OutputPin,
        pulse_us: u64,
    }

    impl GpioStepper {
        pub fn new(step_pin: u8, dir_pin: u8) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let step = gpio
                .get(step_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            let dir = gpio
                .get(dir_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            Ok(Self {
                step,
                dir,
                pulse_us: 500,
            })
        }

        fn pulse(&mut self) {
            self.step.set_high();
            sleep(Duration::from_micros(self.pulse_us));
            self.step.set_low();
        }
    }

    impl Motor for GpioStepper {
        fn step_forward(&mut self) -> Result<(), BoxError> {
            self.dir.set_high();
            self.pulse();
            Ok(())
        }

        fn step_backward(&mut self) -> Result<(), BoxError> {
            self.dir.set_low();
            self.pulse();
            Ok(())
        }
    }

    /// Hall switch on a power output pin and an active-low state input pin.
    pub struct GpioHallSwitch {
        power: OutputPin,
        state: InputPin,
        powered: bool,
    }

    impl GpioHallSwitch {
        pub fn new(power_pin: u8, state_pin: u8) -> Result<Self, HwError> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut power = gpio
                .get(power_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            power.set_low();
            let state = gpio
                .get(state_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input_pullup();
            Ok(Self {
                power,
                state,
                powered: false,
            })
        }
    }

    impl HallSensor for GpioHallSwitch {
        fn set_power(&mut self, on: bool) -> Result<(), BoxError> {
            if on {
                self.power.set_high();
            } else {
                self.power.set_low();
            }
            self.powered = on;
            tracing::debug!(on, "hall switch power");
            Ok(())
        }

        fn is_triggered(&mut self) -> Result<bool, BoxError> {
            // The state line idles high on the pull-up; a magnet pulls it
            // low. An unpowered switch cannot trigger.
            if !self.powered {
                return Ok(false);
            }
            Ok(self.state.is_low())
        }
    }
}

#[cfg(feature = "hardware")]
pub use gpio::{GpioHallSwitch, GpioStepper};

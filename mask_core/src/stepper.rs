//! Fixed-rate stepper motion control.
//!
//! `StepperController` owns the step counter and target and advances them
//! from `update()`, which the host wires to a fixed-rate tick of roughly
//! 125 Hz (see `Ticker`). Mainline commands and the tick share the
//! controller, so the mutable motion state sits behind one short critical
//! section: a command publishes target and behavior together and the tick
//! can never observe a half-written pair.

use std::sync::{Mutex, MutexGuard, PoisonError};

use mask_traits::Motor;

use crate::angles;
use crate::error::BuildError;

/// Current motor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Motor is stopped. Default value.
    #[default]
    Stopped,
    /// Motor is moving forward continuously.
    Forward,
    /// Motor is moving backward continuously.
    Reverse,
    /// Motor is currently approaching its target position.
    Targeting,
    /// Motor has successfully reached its target position.
    ReachedTarget,
}

/// Motion state shared between the mainline and the tick context.
struct Motion<M> {
    driver: M,
    position_steps: i32,
    target_deg: f32,
    target_steps: i32,
    behavior: Behavior,
}

impl<M: Motor> Motion<M> {
    fn step_forward(&mut self) {
        match self.driver.step_forward() {
            Ok(()) => self.position_steps += 1,
            Err(e) => tracing::warn!(error = %e, "step_forward failed; holding position count"),
        }
    }

    fn step_backward(&mut self) {
        match self.driver.step_backward() {
            Ok(()) => self.position_steps -= 1,
            Err(e) => tracing::warn!(error = %e, "step_backward failed; holding position count"),
        }
    }
}

/// Drives a motor one step at a time toward continuous or targeted motion.
pub struct StepperController<M> {
    steps_per_rotation: i32,
    motion: Mutex<Motion<M>>,
}

impl<M: Motor> StepperController<M> {
    /// Binds a motor driver and the number of whole steps per motor
    /// rotation. `update()` should be invoked from a fixed-rate tick at
    /// approximately 125 Hz.
    pub fn new(driver: M, steps_per_rotation: i32) -> Result<Self, BuildError> {
        if steps_per_rotation <= 0 {
            return Err(BuildError::InvalidStepsPerRotation);
        }
        Ok(Self {
            steps_per_rotation,
            motion: Mutex::new(Motion {
                driver,
                position_steps: 0,
                target_deg: 0.0,
                target_steps: 0,
                behavior: Behavior::Stopped,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Motion<M>> {
        // A panic while holding the lock leaves plain data; keep running on
        // the inner value instead of propagating the poison.
        self.motion.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn steps_per_rotation(&self) -> i32 {
        self.steps_per_rotation
    }

    /// Drives the motor forward continuously.
    pub fn forward(&self) {
        self.lock().behavior = Behavior::Forward;
    }

    /// Drives the motor backward continuously.
    pub fn reverse(&self) {
        self.lock().behavior = Behavior::Reverse;
    }

    /// Halts motor motion.
    pub fn stop(&self) {
        self.lock().behavior = Behavior::Stopped;
    }

    /// Rotates the motor to an absolute angle.
    ///
    /// Returns the actual absolute angle rotated to, which may differ from
    /// the request because only whole steps can be realized.
    pub fn rotate_to(&self, target_deg: f32) -> f32 {
        let mut m = self.lock();
        // Momentary stop removes any ambiguity about which position the
        // target is measured against while the new pair is published.
        m.behavior = Behavior::Stopped;
        m.target_deg = target_deg;
        m.target_steps = angles::degrees_to_steps(target_deg, self.steps_per_rotation);
        m.behavior = Behavior::Targeting;
        angles::steps_to_degrees(m.target_steps, self.steps_per_rotation)
    }

    /// Rotates the motor by a relative angle.
    ///
    /// The new absolute target is measured from the live step position, not
    /// from the previously stored target, so repeated relative moves cannot
    /// accumulate float error. Returns the quantized achieved angle.
    pub fn rotate_by(&self, delta_deg: f32) -> f32 {
        let mut m = self.lock();
        m.behavior = Behavior::Stopped;
        m.target_deg =
            angles::steps_to_degrees(m.position_steps, self.steps_per_rotation) + delta_deg;
        m.target_steps = angles::degrees_to_steps(m.target_deg, self.steps_per_rotation);
        m.behavior = Behavior::Targeting;
        angles::steps_to_degrees(m.target_steps, self.steps_per_rotation)
    }

    /// Current absolute position of the motor [deg].
    pub fn position_deg(&self) -> f32 {
        angles::steps_to_degrees(self.lock().position_steps, self.steps_per_rotation)
    }

    /// Current target angle of the motor [deg], as last commanded.
    pub fn target_deg(&self) -> f32 {
        self.lock().target_deg
    }

    /// Currently active behavior.
    pub fn behavior(&self) -> Behavior {
        self.lock().behavior
    }

    /// Establishes the current motor position as absolute zero.
    pub fn set_zero(&self) {
        self.lock().position_steps = 0;
    }

    /// Offsets the existing zero reference by an angle without moving the
    /// motor.
    pub fn offset_zero(&self, relative_deg: f32) {
        let steps = angles::degrees_to_steps(relative_deg, self.steps_per_rotation);
        self.lock().position_steps -= steps;
    }

    /// Advances the motor by at most one step. Call from a fixed-rate tick;
    /// the rate determines the angular speed of continuous motion.
    pub fn update(&self) {
        let mut m = self.lock();
        match m.behavior {
            Behavior::Stopped | Behavior::ReachedTarget => {}
            Behavior::Forward => m.step_forward(),
            Behavior::Reverse => m.step_backward(),
            Behavior::Targeting => {
                if m.position_steps < m.target_steps {
                    m.step_forward();
                } else if m.position_steps > m.target_steps {
                    m.step_backward();
                } else {
                    m.behavior = Behavior::ReachedTarget;
                }
            }
        }
    }

    /// Converts an absolute angle to the closest whole step count.
    pub fn degrees_to_steps(&self, degrees: f32) -> i32 {
        angles::degrees_to_steps(degrees, self.steps_per_rotation)
    }

    /// Converts a step count to the angle formed by traveling it.
    pub fn steps_to_degrees(&self, steps: i32) -> f32 {
        angles::steps_to_degrees(steps, self.steps_per_rotation)
    }
}

//! Gear-reduced mask positioning on top of `StepperController`.
//!
//! Mask-space angles relate to motor-space angles through a fixed signed
//! gear ratio (motor rotations per mask rotation; the sign encodes reversed
//! mounting). Targets are selected in mask space with wrap-around and
//! shortest-path semantics, then commanded as absolute motor angles.

use std::sync::Arc;

use mask_traits::Motor;

use crate::angles::wrap_angle_deg;
use crate::error::BuildError;
use crate::stepper::StepperController;

/// Preference for the direction of a commanded rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// No motion. Default value.
    #[default]
    None,
    /// Forward direction.
    Forward,
    /// Reverse direction.
    Reverse,
    /// Whichever direction reaches the target fastest; ties go forward.
    Auto,
}

/// Operates a `StepperController` to position a mask geared to the motor.
pub struct MaskController<M> {
    stepper: Arc<StepperController<M>>,
    gear_ratio: f32,
    // Last commanded mask-space target, kept unwrapped and independent of
    // the returned value so repeated relative moves don't compound rounding
    // error.
    target_deg: f32,
}

impl<M: Motor> MaskController<M> {
    /// Binds the underlying controller and the motor-to-mask gear ratio.
    pub fn new(stepper: Arc<StepperController<M>>, gear_ratio: f32) -> Result<Self, BuildError> {
        if !gear_ratio.is_finite() || gear_ratio == 0.0 {
            return Err(BuildError::InvalidGearRatio);
        }
        Ok(Self {
            stepper,
            gear_ratio,
            target_deg: 0.0,
        })
    }

    pub fn gear_ratio(&self) -> f32 {
        self.gear_ratio
    }

    /// The shared underlying controller (the tick context holds its own
    /// handle to the same instance).
    pub fn stepper(&self) -> &Arc<StepperController<M>> {
        &self.stepper
    }

    /// Drives the mask forward continuously. Reversed gearing inverts the
    /// perceived direction, so the motor command flips with the ratio sign.
    pub fn forward(&mut self) {
        if self.gear_ratio > 0.0 {
            self.stepper.forward();
        } else {
            self.stepper.reverse();
        }
    }

    /// Drives the mask backward continuously.
    pub fn reverse(&mut self) {
        if self.gear_ratio > 0.0 {
            self.stepper.reverse();
        } else {
            self.stepper.forward();
        }
    }

    /// Halts mask motion.
    pub fn stop(&mut self) {
        self.stepper.stop();
    }

    /// Rotates the mask to an absolute angle along the preferred direction.
    ///
    /// Returns the actual angle rotated to, wrapped into [0, 360) iff
    /// `wrap_result`.
    pub fn rotate_to(&mut self, target_deg: f32, direction: Direction, wrap_result: bool) -> f32 {
        // Stop first so the current angle cannot move underneath the delta
        // computation.
        self.stepper.stop();
        let current_deg = self.position_deg(false);
        let forward_delta_deg = wrap_angle_deg(target_deg - current_deg);
        let reverse_delta_deg = wrap_angle_deg(current_deg - target_deg);

        let delta_deg = match direction {
            Direction::None => 0.0,
            Direction::Forward => forward_delta_deg,
            Direction::Reverse => -reverse_delta_deg,
            Direction::Auto => {
                if forward_delta_deg <= reverse_delta_deg {
                    forward_delta_deg
                } else {
                    -reverse_delta_deg
                }
            }
        };

        self.rotate_by(delta_deg, wrap_result)
    }

    /// Rotates the mask by a relative angle.
    ///
    /// The mask target is recomputed from the live position and commanded as
    /// an absolute motor angle, so the stored mask target and the quantized
    /// motor target cannot drift apart over repeated relative calls.
    pub fn rotate_by(&mut self, delta_deg: f32, wrap_result: bool) -> f32 {
        self.target_deg = self.position_deg(false) + delta_deg;
        let achieved_motor_deg = self.stepper.rotate_to(self.mask_to_motor_deg(self.target_deg));
        let nominal_deg = self.motor_to_mask_deg(achieved_motor_deg);
        if wrap_result {
            wrap_angle_deg(nominal_deg)
        } else {
            nominal_deg
        }
    }

    /// Current absolute position of the mask [deg].
    pub fn position_deg(&self, wrap_result: bool) -> f32 {
        let nominal_deg = self.motor_to_mask_deg(self.stepper.position_deg());
        if wrap_result {
            wrap_angle_deg(nominal_deg)
        } else {
            nominal_deg
        }
    }

    /// Current target position of the mask [deg], as last commanded.
    pub fn target_deg(&self, wrap_result: bool) -> f32 {
        if wrap_result {
            wrap_angle_deg(self.target_deg)
        } else {
            self.target_deg
        }
    }

    /// Establishes the current mask position as absolute zero.
    pub fn set_zero(&mut self) {
        self.stepper.stop();
        self.stepper.set_zero();
    }

    /// Offsets the existing zero reference by a mask-space angle.
    pub fn offset_zero(&mut self, relative_deg: f32) {
        self.stepper.stop();
        self.stepper.offset_zero(self.mask_to_motor_deg(relative_deg));
    }

    /// Converts a mask angle to the motor angle realizing it.
    pub fn mask_to_motor_deg(&self, mask_deg: f32) -> f32 {
        mask_deg * self.gear_ratio
    }

    /// Converts a motor angle to the mask angle it realizes.
    pub fn motor_to_mask_deg(&self, motor_deg: f32) -> f32 {
        motor_deg / self.gear_ratio
    }
}

//! Angle/step arithmetic shared by the motion controllers.
//!
//! Steps are `i32` counts from an arbitrary zero; angles are `f32` degrees.
//! Both conversion directions use one rounding rule (round half away from
//! zero, `f32::round`) so that round trips land on the same step.

/// Degrees spanned by one full rotation.
pub const FULL_TURN_DEG: f32 = 360.0;

/// Convert an absolute angle to the nearest whole step count.
///
/// Non-finite inputs map to 0 and out-of-range results clamp to the `i32`
/// bounds rather than poisoning the step counter.
#[inline]
pub fn degrees_to_steps(degrees: f32, steps_per_rotation: i32) -> i32 {
    if !degrees.is_finite() {
        return 0;
    }
    let scaled = (degrees / FULL_TURN_DEG * steps_per_rotation as f32).round();
    if scaled >= i32::MAX as f32 {
        i32::MAX
    } else if scaled <= i32::MIN as f32 {
        i32::MIN
    } else {
        scaled as i32
    }
}

/// Convert a step count to the absolute angle it spans.
#[inline]
pub fn steps_to_degrees(steps: i32, steps_per_rotation: i32) -> f32 {
    FULL_TURN_DEG * steps as f32 / steps_per_rotation as f32
}

/// Canonical representative of an angle in `[0, 360)`.
///
/// `rem_euclid` can round up to exactly 360.0 for tiny negative inputs;
/// that case folds back to 0.0 so the range invariant holds for every
/// finite input.
#[inline]
pub fn wrap_angle_deg(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(FULL_TURN_DEG);
    if wrapped >= FULL_TURN_DEG { 0.0 } else { wrapped }
}

use std::sync::Arc;

use mask_core::angles::{degrees_to_steps, steps_to_degrees, wrap_angle_deg};
use mask_core::mocks::CountingMotor;
use mask_core::{Direction, MaskController, StepperController};
use proptest::prelude::*;

proptest! {
    #[test]
    fn wrapped_angles_stay_in_canonical_range(
        x in prop::num::f32::NORMAL | prop::num::f32::SUBNORMAL | prop::num::f32::ZERO,
    ) {
        let wrapped = wrap_angle_deg(x);
        prop_assert!((0.0..360.0).contains(&wrapped), "wrap({x}) = {wrapped}");
    }

    #[test]
    fn wrapping_is_periodic(x in -100_000.0f32..100_000.0, k in -100i32..100) {
        let shifted = x + 360.0 * k as f32;
        let a = wrap_angle_deg(x);
        let b = wrap_angle_deg(shifted);
        // f32 carries ~0.01° of resolution at the largest magnitudes used
        // here; equal angles may also land on opposite sides of the 0/360
        // seam.
        let diff = (a - b).abs();
        prop_assert!(
            diff < 0.05 || (360.0 - diff) < 0.05,
            "wrap({x}) = {a} vs wrap({shifted}) = {b}"
        );
    }

    #[test]
    fn conversion_round_trip_stays_within_half_a_step(
        degrees in -3600.0f32..3600.0,
        spr in prop::sample::select(vec![1i32, 3, 48, 200, 400, 1000]),
    ) {
        let back = steps_to_degrees(degrees_to_steps(degrees, spr), spr);
        let half_step_deg = 180.0 / spr as f32;
        prop_assert!(
            (back - degrees).abs() <= half_step_deg + 1e-2,
            "d = {degrees}, spr = {spr}, round trip = {back}"
        );
    }

    #[test]
    fn auto_direction_never_exceeds_half_a_turn(
        start in -720.0f32..720.0,
        target in -720.0f32..720.0,
    ) {
        let stepper = Arc::new(
            StepperController::new(CountingMotor::new(), 200).unwrap(),
        );
        let mut mask = MaskController::new(stepper, 1.0).unwrap();
        // Re-anchor zero so the mask starts near `start` without motion.
        mask.offset_zero(-start);
        let before = mask.position_deg(false);

        let after = mask.rotate_to(target, Direction::Auto, false);

        let step_deg = 360.0 / 200.0;
        prop_assert!(
            (after - before).abs() <= 180.0 + step_deg,
            "start {before}, selected target {after}"
        );
    }
}

use mask_hardware::simulated_rig;
use mask_traits::{HallSensor, Motor};
use rstest::rstest;
use std::sync::atomic::Ordering;

#[test]
fn unpowered_switch_never_triggers() {
    // Window parked right on the starting angle; power gating alone decides
    // the reading.
    let (_stepper, mut hall) = simulated_rig(200, 1.0, 350.0, 10.0);

    assert!(!hall.is_triggered().unwrap());
    hall.set_power(true).unwrap();
    assert!(hall.is_triggered().unwrap());
    hall.set_power(false).unwrap();
    assert!(!hall.is_triggered().unwrap());
}

#[test]
fn window_tracks_the_shared_counter() {
    // 360 steps/rotation at unit gearing: one step per mask degree.
    let (mut stepper, mut hall) = simulated_rig(360, 1.0, 90.0, 100.0);
    hall.set_power(true).unwrap();
    assert!(!hall.is_triggered().unwrap());

    for _ in 0..90 {
        stepper.step_forward().unwrap();
    }
    assert!(hall.is_triggered().unwrap(), "low boundary is inclusive");

    for _ in 0..10 {
        stepper.step_forward().unwrap();
    }
    assert!(!hall.is_triggered().unwrap(), "high boundary is exclusive");

    for _ in 0..5 {
        stepper.step_backward().unwrap();
    }
    assert!(hall.is_triggered().unwrap(), "re-entry from above");
}

#[rstest]
#[case(355, true)]
#[case(5, true)]
#[case(15, false)]
#[case(349, false)]
fn window_may_cross_the_zero_seam(#[case] steps: i32, #[case] inside: bool) {
    let (mut stepper, mut hall) = simulated_rig(360, 1.0, 350.0, 10.0);
    hall.set_power(true).unwrap();
    for _ in 0..steps {
        stepper.step_forward().unwrap();
    }
    assert_eq!(hall.is_triggered().unwrap(), inside, "at {steps} deg");
}

#[test]
fn negative_gear_ratio_maps_reverse_steps_into_the_window() {
    let (mut stepper, mut hall) = simulated_rig(360, -1.0, 30.0, 40.0);
    hall.set_power(true).unwrap();

    // Backward motor steps are forward mask travel through reversed gearing.
    for _ in 0..35 {
        stepper.step_backward().unwrap();
    }
    assert!(hall.is_triggered().unwrap());
}

#[test]
fn rig_shares_one_step_counter() {
    let (mut stepper, hall) = simulated_rig(200, 1.0, 0.0, 1.0);
    let handle = stepper.position_handle();

    stepper.step_forward().unwrap();
    stepper.step_forward().unwrap();
    stepper.step_backward().unwrap();
    assert_eq!(handle.load(Ordering::Relaxed), 1);
    drop(hall);
}

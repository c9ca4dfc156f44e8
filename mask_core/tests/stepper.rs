use std::sync::atomic::Ordering;

use mask_core::mocks::{CountingMotor, FaultyMotor};
use mask_core::{Behavior, BuildError, StepperController};

#[test]
fn rejects_non_positive_steps_per_rotation() {
    assert_eq!(
        StepperController::new(CountingMotor::new(), 0).err(),
        Some(BuildError::InvalidStepsPerRotation)
    );
    assert_eq!(
        StepperController::new(CountingMotor::new(), -200).err(),
        Some(BuildError::InvalidStepsPerRotation)
    );
}

#[test]
fn update_is_a_noop_while_stopped() {
    let motor = CountingMotor::new();
    let counter = motor.counter();
    let ctl = StepperController::new(motor, 200).unwrap();

    for _ in 0..10 {
        ctl.update();
    }

    assert_eq!(counter.load(Ordering::Relaxed), 0);
    assert_eq!(ctl.position_deg(), 0.0);
    assert_eq!(ctl.behavior(), Behavior::Stopped);
}

#[test]
fn continuous_motion_emits_one_step_per_tick() {
    let motor = CountingMotor::new();
    let counter = motor.counter();
    let ctl = StepperController::new(motor, 200).unwrap();

    ctl.forward();
    for _ in 0..3 {
        ctl.update();
    }
    assert_eq!(counter.load(Ordering::Relaxed), 3);
    assert!((ctl.position_deg() - 5.4).abs() < 1e-4);

    ctl.reverse();
    for _ in 0..2 {
        ctl.update();
    }
    assert_eq!(counter.load(Ordering::Relaxed), 1);
    assert!((ctl.position_deg() - 1.8).abs() < 1e-4);

    ctl.stop();
    ctl.update();
    assert_eq!(counter.load(Ordering::Relaxed), 1);
}

#[test]
fn rotate_to_returns_the_quantized_angle() {
    let ctl = StepperController::new(CountingMotor::new(), 200).unwrap();
    // 1° is 0.56 steps; the closest realizable angle is one step, 1.8°.
    let achieved = ctl.rotate_to(1.0);
    assert!((achieved - 1.8).abs() < 1e-4, "achieved {achieved}");
    // The raw request stays visible as the stored target.
    assert_eq!(ctl.target_deg(), 1.0);
}

#[test]
fn targeting_steps_toward_the_target_then_parks() {
    let motor = CountingMotor::new();
    let counter = motor.counter();
    let ctl = StepperController::new(motor, 200).unwrap();

    let achieved = ctl.rotate_to(9.0); // exactly 5 steps
    assert!((achieved - 9.0).abs() < 1e-4);
    assert_eq!(ctl.behavior(), Behavior::Targeting);

    for _ in 0..5 {
        ctl.update();
    }
    assert_eq!(counter.load(Ordering::Relaxed), 5);
    // Arrival is observed on the following tick.
    assert_eq!(ctl.behavior(), Behavior::Targeting);
    ctl.update();
    assert_eq!(ctl.behavior(), Behavior::ReachedTarget);
    assert_eq!(counter.load(Ordering::Relaxed), 5);

    // Parked: further ticks emit nothing.
    ctl.update();
    assert_eq!(counter.load(Ordering::Relaxed), 5);
}

#[test]
fn targeting_reverses_for_targets_behind_the_position() {
    let motor = CountingMotor::new();
    let counter = motor.counter();
    let ctl = StepperController::new(motor, 200).unwrap();

    ctl.rotate_to(-9.0);
    for _ in 0..6 {
        ctl.update();
    }
    assert_eq!(counter.load(Ordering::Relaxed), -5);
    assert_eq!(ctl.behavior(), Behavior::ReachedTarget);
    assert!((ctl.position_deg() + 9.0).abs() < 1e-4);
}

#[test]
fn relative_move_target_is_measured_from_live_position() {
    let ctl = StepperController::new(CountingMotor::new(), 200).unwrap();

    // Command an absolute move but emit no ticks: the motor never left zero.
    ctl.rotate_to(90.0);

    // The relative move must anchor on the live position (still 0°), not on
    // the stored 90° target.
    let achieved = ctl.rotate_by(9.0);
    assert!((achieved - 9.0).abs() < 1e-4, "achieved {achieved}");
    assert_eq!(ctl.target_deg(), 9.0);
}

#[test]
fn split_relative_moves_match_one_absolute_move() {
    // 100 moves of 3.6° (exactly 2 steps each at 200 steps/rotation)
    // against a single rotate_to of the total.
    let ctl = StepperController::new(CountingMotor::new(), 200).unwrap();
    for _ in 0..100 {
        ctl.rotate_by(3.6);
        while ctl.behavior() != Behavior::ReachedTarget {
            ctl.update();
        }
    }

    let reference = StepperController::new(CountingMotor::new(), 200).unwrap();
    reference.rotate_to(360.0);
    while reference.behavior() != Behavior::ReachedTarget {
        reference.update();
    }

    let step_deg = 360.0 / 200.0;
    assert!(
        (ctl.position_deg() - reference.position_deg()).abs() <= step_deg + 1e-3,
        "split {} vs absolute {}",
        ctl.position_deg(),
        reference.position_deg()
    );
}

#[test]
fn set_zero_and_offset_zero_reanchor_without_motion() {
    let motor = CountingMotor::new();
    let counter = motor.counter();
    let ctl = StepperController::new(motor, 200).unwrap();

    ctl.offset_zero(9.0);
    assert_eq!(counter.load(Ordering::Relaxed), 0, "offset_zero moved the motor");
    assert!((ctl.position_deg() + 9.0).abs() < 1e-4);

    ctl.set_zero();
    assert_eq!(counter.load(Ordering::Relaxed), 0);
    assert_eq!(ctl.position_deg(), 0.0);
}

#[test]
fn failed_driver_steps_do_not_advance_the_counter() {
    let ctl = StepperController::new(FaultyMotor, 200).unwrap();
    ctl.forward();
    for _ in 0..5 {
        ctl.update();
    }
    assert_eq!(ctl.position_deg(), 0.0);
    assert_eq!(ctl.behavior(), Behavior::Forward);
}

#[test]
fn conversions_round_trip_on_exact_steps() {
    let ctl = StepperController::new(CountingMotor::new(), 200).unwrap();
    assert_eq!(ctl.degrees_to_steps(90.0), 50);
    assert_eq!(ctl.steps_to_degrees(50), 90.0);
    assert_eq!(ctl.degrees_to_steps(ctl.steps_to_degrees(123)), 123);
}

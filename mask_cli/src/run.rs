//! Hardware assembly and command execution.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mask_core::{
    Behavior, Direction, GearingCfg, IndexOutcome, IndexState, IndexTask, IndexingCfg,
    MaskController, MotionCfg, StepperController, Ticker,
};
use mask_traits::clock::MonotonicClock;
use mask_traits::{HallSensor, Motor};

/// Simulated trigger zone: ten degrees of mask travel centered on 30.
#[cfg(not(feature = "hardware"))]
const SIM_WINDOW_LOW_DEG: f32 = 25.0;
#[cfg(not(feature = "hardware"))]
const SIM_WINDOW_HIGH_DEG: f32 = 35.0;

#[cfg(not(feature = "hardware"))]
pub fn build_rig(
    cfg: &mask_config::Config,
) -> eyre::Result<(mask_hardware::SimulatedStepper, mask_hardware::SimulatedHallSwitch)> {
    tracing::info!("using simulated hardware");
    Ok(mask_hardware::simulated_rig(
        cfg.motor.steps_per_rotation,
        cfg.mask.gear_ratio,
        SIM_WINDOW_LOW_DEG,
        SIM_WINDOW_HIGH_DEG,
    ))
}

#[cfg(feature = "hardware")]
pub fn build_rig(
    cfg: &mask_config::Config,
) -> eyre::Result<(mask_hardware::GpioStepper, mask_hardware::GpioHallSwitch)> {
    let step = cfg.pins.motor_step.unwrap_or(13);
    let dir = cfg.pins.motor_dir.unwrap_or(19);
    let power = cfg.pins.hall_power.unwrap_or(5);
    let state = cfg.pins.hall_state.unwrap_or(6);
    tracing::info!(step, dir, power, state, "using GPIO hardware");
    let motor = mask_hardware::GpioStepper::new(step, dir)?;
    let hall = mask_hardware::GpioHallSwitch::new(power, state)?;
    Ok((motor, hall))
}

/// Runs one calibration pass to completion. Returns the process exit code.
pub fn run_index<M, S>(
    motor: M,
    sensor: S,
    cfg: &mask_config::Config,
    timeout_ms_override: Option<u64>,
    shutdown: &AtomicBool,
    json: bool,
) -> eyre::Result<i32>
where
    M: Motor + Send + 'static,
    S: HallSensor,
{
    let motion = MotionCfg::from(&cfg.motor);
    let gearing = GearingCfg::from(&cfg.mask);
    let mut indexing = IndexingCfg::from(&cfg.indexing);
    if let Some(ms) = timeout_ms_override {
        indexing.timeout_ms = ms;
    }

    let stepper = Arc::new(StepperController::new(motor, motion.steps_per_rotation)?);
    let _ticker = Ticker::spawn(stepper.clone(), motion.tick_rate_hz, MonotonicClock::new());
    let mask = MaskController::new(stepper.clone(), gearing.gear_ratio)?;

    let result: Rc<Cell<Option<IndexOutcome>>> = Rc::new(Cell::new(None));
    let sink = result.clone();
    let mut task = IndexTask::builder(mask, sensor)
        .with_timeout_ms(indexing.timeout_ms)
        .with_listener(move |outcome: IndexOutcome| sink.set(Some(outcome)))
        .build()?;

    task.init();
    task.index();
    tracing::info!(timeout_ms = indexing.timeout_ms, "index pass requested");

    let poll = Duration::from_millis(2);
    loop {
        if shutdown.load(Ordering::Relaxed) {
            task.mask_mut().stop();
            eyre::bail!("interrupted");
        }
        task.step();
        match task.state() {
            IndexState::Indexed | IndexState::CannotIndex => break,
            _ => std::thread::sleep(poll),
        }
    }

    // Let the post-index return-to-zero move finish before reporting.
    while task.state() == IndexState::Indexed
        && stepper.behavior() == Behavior::Targeting
        && !shutdown.load(Ordering::Relaxed)
    {
        std::thread::sleep(poll);
    }

    let outcome = result.get().unwrap_or(IndexOutcome {
        found: false,
        offset_deg: 0.0,
    });
    let position_deg = task.mask().position_deg(true);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "found": outcome.found,
                "offset_deg": outcome.offset_deg,
                "position_deg": position_deg,
                "state": format!("{:?}", task.state()),
            })
        );
    } else if outcome.found {
        println!(
            "indexed: zero offset {:.2} deg, mask at {:.2} deg",
            outcome.offset_deg, position_deg
        );
    } else {
        println!("index failed: no reference found before timeout");
    }
    Ok(if outcome.found { 0 } else { 1 })
}

/// Rotates the mask to an absolute angle and waits for arrival.
pub fn run_rotate<M>(
    motor: M,
    cfg: &mask_config::Config,
    degrees: f32,
    direction: Direction,
    shutdown: &AtomicBool,
    json: bool,
) -> eyre::Result<i32>
where
    M: Motor + Send + 'static,
{
    let motion = MotionCfg::from(&cfg.motor);
    let gearing = GearingCfg::from(&cfg.mask);

    let stepper = Arc::new(StepperController::new(motor, motion.steps_per_rotation)?);
    let _ticker = Ticker::spawn(stepper.clone(), motion.tick_rate_hz, MonotonicClock::new());
    let mut mask = MaskController::new(stepper.clone(), gearing.gear_ratio)?;

    let achieved_deg = mask.rotate_to(degrees, direction, true);
    tracing::info!(degrees, achieved_deg, "rotate commanded");

    let poll = Duration::from_millis(2);
    while stepper.behavior() == Behavior::Targeting {
        if shutdown.load(Ordering::Relaxed) {
            mask.stop();
            eyre::bail!("interrupted");
        }
        std::thread::sleep(poll);
    }

    let position_deg = mask.position_deg(true);
    if json {
        println!(
            "{}",
            serde_json::json!({
                "achieved_deg": achieved_deg,
                "position_deg": position_deg,
            })
        );
    } else {
        println!("mask at {position_deg:.2} deg (commanded {achieved_deg:.2} deg)");
    }
    Ok(0)
}

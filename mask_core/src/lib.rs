#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Hardware-agnostic mask motion and indexing core.
//!
//! This crate drives a gear-reduced rotating mask on a stepper motor and
//! self-calibrates its zero reference against a Hall-effect switch. All
//! hardware interactions go through the `mask_traits::Motor` and
//! `mask_traits::HallSensor` traits.
//!
//! ## Architecture
//!
//! - **StepperController**: step counter + target, advanced at most one step
//!   per fixed-rate tick (`stepper` module)
//! - **MaskController**: gear ratio, angle wrapping, shortest-path targeting
//!   in mask-space degrees (`mask` module)
//! - **IndexTask**: cooperative calibration state machine locating the Hall
//!   trigger zone and re-anchoring zero on its center (`index` module)
//! - **Ticker**: host-side fixed-rate tick thread (`ticker` module)
//!
//! ## Execution contexts
//!
//! Two contexts run concurrently: the mainline, which polls
//! `IndexTask::step()` and issues motion commands, and the tick context,
//! which calls `StepperController::update()` at a fixed rate. Only the
//! stepper's motion state crosses the boundary; it lives behind a single
//! short critical section so a position/target pair can never be observed
//! half-written.

pub mod angles;
pub mod config;
pub mod error;
pub mod index;
pub mod mask;
pub mod mocks;
pub mod stepper;
pub mod ticker;

pub use config::{GearingCfg, IndexingCfg, MotionCfg};
pub use error::BuildError;
pub use index::{
    DEFAULT_INDEX_TIMEOUT_MS, IndexListener, IndexOutcome, IndexState, IndexTask,
    IndexTaskBuilder,
};
pub use mask::{Direction, MaskController};
pub use stepper::{Behavior, StepperController};
pub use ticker::Ticker;

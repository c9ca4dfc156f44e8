//! Zero-reference calibration against the Hall switch.
//!
//! `IndexTask` is a cooperative task: the host polls `step()` every loop
//! iteration and each call does at most one bounded unit of work, never
//! blocking. Waiting is expressed by staying in a state across polls while
//! the tick context moves the motor underneath.
//!
//! A calibration pass sweeps the mask across the sensor's trigger zone
//! forward and in reverse, records the four boundary-crossing angles, and
//! re-anchors the mask zero on their average. Any waiting state that sees no
//! sensor transition within the timeout fails the pass into `CannotIndex`;
//! another `index()` request restarts it.

use std::sync::Arc;
use std::time::Instant;

use mask_traits::clock::{Clock, MonotonicClock};
use mask_traits::{HallSensor, Motor};

use crate::error::BuildError;
use crate::mask::{Direction, MaskController};

/// Default bound on the time between state-advancing events [ms].
pub const DEFAULT_INDEX_TIMEOUT_MS: u64 = 10_000;

const NUM_KEY_POSITIONS: usize = 4;

/// Calibration progress. Transitions happen only inside `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexState {
    /// Waiting for an init request. Default value.
    #[default]
    Start,
    /// Armed; waiting for an index request.
    Init,
    /// Driving forward until the sensor reads low, in case the pass began
    /// inside the trigger zone.
    WaitingForForwardLow,
    /// Driving forward, hunting for the rising edge.
    ForwardLow,
    /// Inside the trigger zone, hunting for the falling edge.
    ForwardHigh,
    /// Retreading in reverse, hunting for the zone again.
    ReverseLow,
    /// Inside the zone in reverse, hunting for the exit.
    ReverseHigh,
    /// Zero reference established.
    Indexed,
    /// Pass failed; restartable via another index request.
    CannotIndex,
}

/// Result of one completed calibration pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOutcome {
    /// Whether a zero reference was established.
    pub found: bool,
    /// The zero offset that was applied [deg]; 0 when `found` is false.
    pub offset_deg: f32,
}

/// Observer notified exactly once per completed calibration pass.
///
/// With no listener registered, notifications are dropped, never buffered.
pub trait IndexListener {
    fn on_index_complete(&mut self, outcome: IndexOutcome);
}

impl<F: FnMut(IndexOutcome)> IndexListener for F {
    fn on_index_complete(&mut self, outcome: IndexOutcome) {
        self(outcome)
    }
}

/// Cooperative calibration task binding a mask controller and Hall sensor.
pub struct IndexTask<M, S> {
    mask: MaskController<M>,
    sensor: S,
    clock: Arc<dyn Clock + Send + Sync>,
    timeout_ms: u64,
    listener: Option<Box<dyn IndexListener>>,
    state: IndexState,
    init_requested: bool,
    index_requested: bool,
    progress_at: Instant,
    key_positions_deg: [f32; NUM_KEY_POSITIONS],
}

impl<M: Motor, S: HallSensor> IndexTask<M, S> {
    /// Starts building a task over the given controller and sensor.
    pub fn builder(mask: MaskController<M>, sensor: S) -> IndexTaskBuilder<M, S> {
        IndexTaskBuilder {
            mask,
            sensor,
            timeout_ms: DEFAULT_INDEX_TIMEOUT_MS,
            clock: None,
            listener: None,
        }
    }

    /// Arms the task. Idempotent while the request is pending; consumed on
    /// the `Start` state's transition out.
    pub fn init(&mut self) {
        self.init_requested = true;
    }

    /// Requests a calibration pass. A second request before the first
    /// completes is coalesced, not queued.
    pub fn index(&mut self) {
        self.index_requested = true;
    }

    /// Current state; pure read.
    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn mask(&self) -> &MaskController<M> {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut MaskController<M> {
        &mut self.mask
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Replaces the completion listener; `None` drops future notifications.
    pub fn set_listener(&mut self, listener: Option<Box<dyn IndexListener>>) {
        self.listener = listener;
    }

    /// Hard reset: halts motion, powers the sensor down, clears pending
    /// requests, and returns to `Start`.
    pub fn reset(&mut self) {
        self.mask.stop();
        self.sensor_power(false);
        self.init_requested = false;
        self.index_requested = false;
        self.state = IndexState::Start;
    }

    /// Advances the state machine by at most one transition per call.
    pub fn step(&mut self) {
        match self.state {
            IndexState::Start => {
                if self.init_requested {
                    self.init_requested = false;
                    self.mask.stop();
                    self.sensor_power(false);
                    self.state = IndexState::Init;
                }
            }
            IndexState::Init => {
                if self.index_requested {
                    self.begin_pass();
                }
            }
            IndexState::WaitingForForwardLow => match self.read_sensor() {
                Some(false) => {
                    self.mark_progress();
                    self.state = IndexState::ForwardLow;
                }
                Some(true) | None => self.check_timeout(),
            },
            IndexState::ForwardLow => match self.read_sensor() {
                Some(true) => {
                    self.key_positions_deg[0] = self.mask.position_deg(false);
                    self.mark_progress();
                    self.state = IndexState::ForwardHigh;
                }
                Some(false) | None => self.check_timeout(),
            },
            IndexState::ForwardHigh => match self.read_sensor() {
                Some(false) => {
                    self.key_positions_deg[1] = self.mask.position_deg(false);
                    self.mask.reverse();
                    self.mark_progress();
                    self.state = IndexState::ReverseLow;
                }
                Some(true) | None => self.check_timeout(),
            },
            IndexState::ReverseLow => match self.read_sensor() {
                Some(true) => {
                    self.key_positions_deg[2] = self.mask.position_deg(false);
                    self.mark_progress();
                    self.state = IndexState::ReverseHigh;
                }
                Some(false) | None => self.check_timeout(),
            },
            IndexState::ReverseHigh => match self.read_sensor() {
                Some(false) => self.finish_pass(),
                Some(true) | None => self.check_timeout(),
            },
            IndexState::Indexed | IndexState::CannotIndex => {
                if self.index_requested {
                    self.begin_pass();
                }
            }
        }
    }

    /// Common entry into a fresh sweep from `Init`, `Indexed`, or
    /// `CannotIndex`.
    fn begin_pass(&mut self) {
        self.index_requested = false;
        self.key_positions_deg = [0.0; NUM_KEY_POSITIONS];
        self.mask.forward();
        self.sensor_power(true);
        self.mark_progress();
        self.state = IndexState::WaitingForForwardLow;
        tracing::debug!("index pass started");
    }

    /// Fourth crossing observed: average the recorded angles, re-anchor
    /// zero there, and return the mask to the new zero.
    fn finish_pass(&mut self) {
        self.key_positions_deg[NUM_KEY_POSITIONS - 1] = self.mask.position_deg(false);
        self.mask.stop();
        let offset_deg =
            self.key_positions_deg.iter().sum::<f32>() / NUM_KEY_POSITIONS as f32;
        self.mask.offset_zero(offset_deg);
        self.mask.rotate_to(0.0, Direction::Auto, true);
        self.sensor_power(false);
        self.mark_progress();
        self.state = IndexState::Indexed;
        tracing::info!(offset_deg, "index pass complete");
        self.notify(IndexOutcome {
            found: true,
            offset_deg,
        });
    }

    fn fail_pass(&mut self) {
        self.mask.stop();
        self.sensor_power(false);
        self.state = IndexState::CannotIndex;
        tracing::warn!("index pass timed out");
        self.notify(IndexOutcome {
            found: false,
            offset_deg: 0.0,
        });
    }

    /// Detection granularity is bounded by the polling cadence: the check
    /// runs only when `step()` is invoked.
    fn check_timeout(&mut self) {
        if self.clock.ms_since(self.progress_at) > self.timeout_ms {
            self.fail_pass();
        }
    }

    fn mark_progress(&mut self) {
        self.progress_at = self.clock.now();
    }

    /// A failed read is treated as no observation: the state does not
    /// advance, and a persistently failing sensor ends the pass through the
    /// timeout.
    fn read_sensor(&mut self) -> Option<bool> {
        match self.sensor.is_triggered() {
            Ok(triggered) => Some(triggered),
            Err(e) => {
                tracing::warn!(error = %e, "hall sensor read failed");
                None
            }
        }
    }

    fn sensor_power(&mut self, on: bool) {
        if let Err(e) = self.sensor.set_power(on) {
            tracing::warn!(error = %e, on, "hall sensor power switch failed");
        }
    }

    fn notify(&mut self, outcome: IndexOutcome) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_index_complete(outcome);
        }
    }
}

/// Builder for `IndexTask`; validates the timeout on `build()`.
pub struct IndexTaskBuilder<M, S> {
    mask: MaskController<M>,
    sensor: S,
    timeout_ms: u64,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    listener: Option<Box<dyn IndexListener>>,
}

impl<M: Motor, S: HallSensor> IndexTaskBuilder<M, S> {
    /// Bound on the time between state-advancing events [ms].
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Injects a clock; tests use this to drive the timeout deterministically.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Registers the completion listener.
    pub fn with_listener(mut self, listener: impl IndexListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn build(self) -> Result<IndexTask<M, S>, BuildError> {
        if self.timeout_ms == 0 {
            return Err(BuildError::InvalidTimeout);
        }
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let progress_at = clock.now();
        Ok(IndexTask {
            mask: self.mask,
            sensor: self.sensor,
            clock,
            timeout_ms: self.timeout_ms,
            listener: self.listener,
            state: IndexState::Start,
            init_requested: false,
            index_requested: false,
            progress_at,
            key_positions_deg: [0.0; NUM_KEY_POSITIONS],
        })
    }
}

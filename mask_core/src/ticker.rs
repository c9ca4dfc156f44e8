//! Fixed-rate tick thread driving `StepperController::update()`.
//!
//! Stands in for the hardware timer interrupt on hosted builds: one thread,
//! one `update()` per period. The thread is signalled and joined on `Drop`,
//! so a `Ticker` cannot leak its thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use mask_traits::Motor;
use mask_traits::clock::Clock;

use crate::stepper::StepperController;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Tick period in microseconds for a given rate in Hz.
/// Clamps `hz` to at least 1 and the result to at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Handle to the tick thread; dropping it stops the ticks.
pub struct Ticker {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns the tick thread at `tick_rate_hz` (clamped to >= 1 Hz).
    pub fn spawn<M, C>(stepper: Arc<StepperController<M>>, tick_rate_hz: u32, clock: C) -> Self
    where
        M: Motor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();
        let period = Duration::from_micros(period_us(tick_rate_hz));

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_flag.load(Ordering::Relaxed) {
                    break;
                }
                stepper.update();
                clock.sleep(period);
            }
            tracing::trace!("ticker thread exiting");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "ticker thread panicked during shutdown");
            }
        }
    }
}

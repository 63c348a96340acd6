//! Simulated progress.
//!
//! [`ProgressTracker`] publishes the panel's [`ProgressState`] on a watch
//! channel. [`ProgressSimulator`] advances it on a fixed cadence while a run
//! is pending. The percentage is cosmetic pacing: it never reflects real
//! remote progress and never decides when a result is ready.

use std::sync::Arc;

use cipherscope_core::constants::{PROGRESS_CEILING, PROGRESS_COMPLETE};
use cipherscope_core::{Cadence, ProgressState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::cancel::RunHandle;

/// Shared progress state of one panel.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<ProgressState>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::IDLE);
        Self { tx: Arc::new(tx) }
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> ProgressState {
        *self.tx.borrow()
    }

    /// Enter flight at 0%.
    pub fn start(&self, run: &RunHandle) -> bool {
        self.set_if_current(run, ProgressState {
            percent: 0,
            in_flight: true,
        })
    }

    /// Advance by `increment`, capped at the ceiling. Does nothing unless
    /// `run` is current, the run is in flight and the ceiling is not reached.
    /// Returns whether the state changed.
    pub fn advance(&self, run: &RunHandle, increment: u8) -> bool {
        self.tx.send_if_modified(|state| {
            if !run.is_current() || !state.in_flight || state.percent >= PROGRESS_CEILING {
                return false;
            }
            state.percent = state.percent.saturating_add(increment).min(PROGRESS_CEILING);
            true
        })
    }

    /// Force 100% after a successful settlement; still in flight until the
    /// settle delay elapses.
    pub fn complete(&self, run: &RunHandle) -> bool {
        self.set_if_current(run, ProgressState {
            percent: PROGRESS_COMPLETE,
            in_flight: true,
        })
    }

    /// Drop to 0% after a failed settlement; the in-flight flag clears with
    /// the settle delay.
    pub fn fail(&self, run: &RunHandle) -> bool {
        self.set_if_current(run, ProgressState {
            percent: 0,
            in_flight: true,
        })
    }

    /// Back to idle at 0%.
    pub fn reset(&self, run: &RunHandle) -> bool {
        self.set_if_current(run, ProgressState::IDLE)
    }

    /// Back to idle regardless of generation.
    pub fn force_idle(&self) {
        self.tx.send_replace(ProgressState::IDLE);
    }

    /// Whether the ceiling has been reached.
    pub fn at_ceiling(&self) -> bool {
        self.snapshot().percent >= PROGRESS_CEILING
    }

    fn set_if_current(&self, run: &RunHandle, next: ProgressState) -> bool {
        self.tx.send_if_modified(|state| {
            if !run.is_current() || *state == next {
                return false;
            }
            *state = next;
            true
        })
    }
}

/// Timer task driving one run's cadence. Dropping it stops the timer.
#[derive(Debug)]
pub struct ProgressSimulator {
    task: JoinHandle<()>,
}

impl ProgressSimulator {
    /// Start ticking every `cadence.interval()`, first tick one interval from
    /// now. The task ends on its own once the ceiling is reached or `run`
    /// goes stale.
    pub fn start(tracker: ProgressTracker, run: RunHandle, cadence: Cadence) -> Self {
        let task = tokio::spawn(async move {
            let period = cadence.interval();
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        tracker.advance(&run, cadence.increment());
                        if tracker.at_ceiling() || !run.is_current() {
                            break;
                        }
                    }
                    _ = run.superseded() => break,
                }
            }
            tracing::trace!(run = run.id(), "progress simulator finished");
        });
        Self { task }
    }

    /// Stop the timer. Equivalent to dropping the simulator.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! Run generations.
//!
//! Every run takes a [`RunHandle`] from its panel's [`RunGeneration`].
//! Starting another run, or shutting the panel down, bumps the generation and
//! makes every older handle stale. Timer ticks, settle timers and late remote
//! results check their handle before touching shared state.

use tokio::sync::watch;

/// Monotonic run counter shared by one panel.
#[derive(Debug)]
pub struct RunGeneration {
    tx: watch::Sender<u64>,
}

impl Default for RunGeneration {
    fn default() -> Self {
        Self::new()
    }
}

impl RunGeneration {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Start a new generation and return its handle.
    pub fn begin(&self) -> RunHandle {
        let mut id = 0;
        self.tx.send_modify(|g| {
            *g += 1;
            id = *g;
        });
        RunHandle {
            id,
            rx: self.tx.subscribe(),
        }
    }

    /// Make every outstanding handle stale without starting a run.
    pub fn invalidate(&self) {
        self.tx.send_modify(|g| *g += 1);
    }

    /// Current generation number.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }
}

/// Ticket for one run.
#[derive(Debug, Clone)]
pub struct RunHandle {
    id: u64,
    rx: watch::Receiver<u64>,
}

impl RunHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer run or shutdown has happened since this one began.
    pub fn is_current(&self) -> bool {
        *self.rx.borrow() == self.id
    }

    /// Resolves once this handle becomes stale.
    pub async fn superseded(&self) {
        let mut rx = self.rx.clone();
        // A closed channel means the panel is gone, which also ends the run.
        let _ = rx.wait_for(|g| *g != self.id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_run_invalidates_old_handle() {
        let generation = RunGeneration::new();
        let first = generation.begin();
        assert!(first.is_current());
        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(generation.current(), second.id());
    }

    #[test]
    fn invalidate_stales_everything() {
        let generation = RunGeneration::new();
        let handle = generation.begin();
        generation.invalidate();
        assert!(!handle.is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_resolves_on_new_run() {
        let generation = RunGeneration::new();
        let handle = generation.begin();

        let pending = tokio::time::timeout(Duration::from_millis(10), handle.superseded()).await;
        assert!(pending.is_err(), "current handle must not resolve");

        generation.begin();
        tokio::time::timeout(Duration::from_millis(10), handle.superseded())
            .await
            .expect("stale handle resolves");
    }
}

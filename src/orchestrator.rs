//! One-run-at-a-time orchestration of attacks and studies.
//!
//! A panel moves through
//! `Idle → Validating → Pending → Settled(Success | Failure) → Idle`.
//! [`PanelState::apply`] is the only place transitions happen; the
//! [`Orchestrator`] feeds it events from validation, the remote call and the
//! settle timer, and drives the cosmetic progress indicator alongside.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cipherscope_core::{
    build_attack, build_study, AttackForm, AttackResult, Cadence, ComparisonSet,
    ProgressState, StudyForm, StudyReport, ValidationError,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::cancel::{RunGeneration, RunHandle};
use crate::client::Client;
use crate::config::Config;
use crate::error::{ClientError, RunError, TransportError};
use crate::progress::{ProgressSimulator, ProgressTracker};
use crate::transport::{HttpTransport, Transport};

// ============================================================================
// State machine
// ============================================================================

/// How a settled run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Lifecycle phase of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Pending,
    Settled(Outcome),
}

/// Normalized result held by a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "lowercase")]
pub enum PanelReport {
    Attack(AttackResult),
    Study(StudyReport),
}

/// Input to [`PanelState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// The user asked for a run.
    Trigger,
    /// Local validation failed with this message.
    Rejected(String),
    /// Validation passed and the remote call went out.
    Dispatched,
    /// The remote call resolved with a normalized report.
    Succeeded(PanelReport),
    /// The remote call failed with this user-facing message.
    Failed(String),
    /// The settle delay elapsed.
    SettleElapsed,
    /// Shutdown: forget everything.
    Reset,
}

/// Phase plus the mutually exclusive report and error of one panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub phase: Phase,
    pub report: Option<PanelReport>,
    pub error: Option<String>,
}

impl PanelState {
    /// Apply one event. Returns `false`, leaving the state untouched, when
    /// the event is not accepted in the current phase.
    pub fn apply(&mut self, event: PanelEvent) -> bool {
        match (self.phase, event) {
            (Phase::Pending, PanelEvent::Trigger) => false,
            (_, PanelEvent::Trigger) => {
                self.phase = Phase::Validating;
                true
            }
            (Phase::Validating, PanelEvent::Rejected(message)) => {
                self.phase = Phase::Idle;
                self.report = None;
                self.error = Some(message);
                true
            }
            (Phase::Validating, PanelEvent::Dispatched) => {
                self.phase = Phase::Pending;
                true
            }
            (Phase::Pending, PanelEvent::Succeeded(report)) => {
                self.phase = Phase::Settled(Outcome::Success);
                self.report = Some(report);
                self.error = None;
                true
            }
            (Phase::Pending, PanelEvent::Failed(message)) => {
                self.phase = Phase::Settled(Outcome::Failure);
                self.report = None;
                self.error = Some(message);
                true
            }
            (Phase::Settled(_), PanelEvent::SettleElapsed) => {
                self.phase = Phase::Idle;
                true
            }
            (_, PanelEvent::Reset) => {
                *self = PanelState::default();
                true
            }
            (phase, event) => {
                tracing::debug!(?phase, ?event, "ignored panel event");
                false
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }
}

/// Everything a renderer needs about a panel at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub phase: Phase,
    pub progress: ProgressState,
    pub report: Option<PanelReport>,
    pub error: Option<String>,
}

// ============================================================================
// Orchestrator
// ============================================================================

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<PanelState>,
    progress: ProgressTracker,
    generation: RunGeneration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives runs for one panel.
///
/// At most one run is pending at a time; a trigger while pending fails with
/// [`RunError::Busy`] and changes nothing. Must be used inside a tokio
/// runtime: the progress timer and the settle timer are spawned tasks.
#[derive(Debug)]
pub struct Orchestrator<T = HttpTransport> {
    client: Client<T>,
    request_timeout: Duration,
    settle_delay: Duration,
    progress_enabled: bool,
    shared: Arc<Shared>,
}

impl Orchestrator<HttpTransport> {
    /// Orchestrator talking HTTP to `config.base_url`.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        Ok(Self::with_client(Client::new(config)?, config))
    }
}

impl<T: Transport> Orchestrator<T> {
    /// Orchestrator over an existing client; timing settings come from `config`.
    pub fn with_client(client: Client<T>, config: &Config) -> Self {
        Self {
            client,
            request_timeout: config.request_timeout,
            settle_delay: config.settle_delay,
            progress_enabled: config.progress_enabled,
            shared: Arc::default(),
        }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn comparison(&self) -> &ComparisonSet {
        self.client.comparison()
    }

    /// Current phase, progress, report and error.
    pub fn snapshot(&self) -> PanelSnapshot {
        let state = self.shared.lock();
        PanelSnapshot {
            phase: state.phase,
            progress: self.shared.progress.snapshot(),
            report: state.report.clone(),
            error: state.error.clone(),
        }
    }

    /// Receiver that sees every progress update.
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressState> {
        self.shared.progress.subscribe()
    }

    /// Validate, dispatch and settle one attack.
    pub async fn run_attack(&self, form: AttackForm) -> Result<AttackResult, RunError> {
        let attack = form.attack;
        let run = self.trigger()?;
        if let Err(e) = form.validate() {
            return Err(self.reject(&run, e));
        }
        let request = build_attack(&form);
        tracing::info!(%attack, endpoint = request.endpoint(), run = run.id(), "dispatching attack");
        self.execute(
            run,
            Some(attack.cadence()),
            attack.fallback_error(),
            self.client.attack(&request),
            PanelReport::Attack,
        )
        .await
    }

    /// Validate, dispatch and settle one study. Studies have no cadence: the
    /// indicator sits at 0% in flight and jumps to 100% on success.
    pub async fn run_study(&self, form: StudyForm) -> Result<StudyReport, RunError> {
        let run = self.trigger()?;
        if let Err(e) = form.validate() {
            return Err(self.reject(&run, e));
        }
        let request = build_study(&form);
        tracing::info!(study = form.label(), endpoint = request.endpoint(), run = run.id(), "dispatching study");
        self.execute(
            run,
            None,
            form.fallback_error(),
            self.client.study(&request),
            PanelReport::Study,
        )
        .await
    }

    /// Invalidate every outstanding run and return the panel to idle.
    /// A caller still awaiting a run gets [`RunError::Superseded`].
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        self.shared.generation.invalidate();
        state.apply(PanelEvent::Reset);
        self.shared.progress.force_idle();
        tracing::debug!("panel shut down");
    }

    fn trigger(&self) -> Result<RunHandle, RunError> {
        let mut state = self.shared.lock();
        if !state.apply(PanelEvent::Trigger) {
            tracing::warn!("run rejected: another run is pending");
            return Err(RunError::Busy);
        }
        let run = self.shared.generation.begin();
        self.shared.progress.reset(&run);
        Ok(run)
    }

    fn reject(&self, run: &RunHandle, error: ValidationError) -> RunError {
        let mut state = self.shared.lock();
        if !run.is_current() {
            return RunError::Superseded;
        }
        tracing::info!(run = run.id(), %error, "validation failed");
        state.apply(PanelEvent::Rejected(error.to_string()));
        RunError::Invalid(error)
    }

    async fn execute<R, F>(
        &self,
        run: RunHandle,
        cadence: Option<Cadence>,
        fallback: &str,
        call: F,
        wrap: fn(R) -> PanelReport,
    ) -> Result<R, RunError>
    where
        R: Clone,
        F: Future<Output = Result<R, ClientError>>,
    {
        {
            let mut state = self.shared.lock();
            if !run.is_current() {
                return Err(RunError::Superseded);
            }
            state.apply(PanelEvent::Dispatched);
            self.shared.progress.start(&run);
        }

        let simulator = cadence
            .filter(|_| self.progress_enabled)
            .map(|c| ProgressSimulator::start(self.shared.progress.clone(), run.clone(), c));

        let resolved = tokio::select! {
            biased;
            _ = run.superseded() => None,
            result = tokio::time::timeout(self.request_timeout, call) => {
                Some(result.unwrap_or_else(|_| Err(ClientError::Timeout)))
            }
        };
        drop(simulator);

        let Some(resolved) = resolved else {
            tracing::debug!(run = run.id(), "run superseded while pending");
            return Err(RunError::Superseded);
        };

        let settled = {
            let mut state = self.shared.lock();
            if !run.is_current() {
                return Err(RunError::Superseded);
            }
            match resolved {
                Ok(report) => {
                    state.apply(PanelEvent::Succeeded(wrap(report.clone())));
                    self.shared.progress.complete(&run);
                    tracing::info!(run = run.id(), "run succeeded");
                    Ok(report)
                }
                Err(error) => {
                    let message = error.user_message(fallback);
                    tracing::warn!(run = run.id(), %error, "run failed: {message}");
                    state.apply(PanelEvent::Failed(message.clone()));
                    self.shared.progress.fail(&run);
                    Err(RunError::Failed(message))
                }
            }
        };

        self.schedule_settle(run);
        settled
    }

    fn schedule_settle(&self, run: RunHandle) {
        let shared = Arc::clone(&self.shared);
        let delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = run.superseded() => return,
            }
            let mut state = shared.lock();
            if run.is_current() {
                state.apply(PanelEvent::SettleElapsed);
                shared.progress.reset(&run);
            }
        });
    }
}

//! The progress state machine.
//!
//! Owns the current [`Phase`] and the single pending delayed transition.
//! Driven by the interceptor through [`ActivityObserver`]; read by the
//! rendering layer through a watch channel.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::watch;

use crate::config::TimingConfig;
use crate::intercept::ActivityObserver;
use crate::observability::metrics;
use crate::progress::phase::Phase;
use crate::progress::timer::{ScheduledTransition, TokenSource, TransitionToken};

/// Point-in-time view of the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    /// Number of times the indicator entered `start`.
    pub starts: u64,
    /// Number of times the indicator entered `complete`.
    pub completions: u64,
    pub torn_down: bool,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    pending: Option<ScheduledTransition>,
    tokens: TokenSource,
    starts: u64,
    completions: u64,
    torn_down: bool,
}

struct Shared {
    state: Mutex<State>,
    phase_tx: watch::Sender<Phase>,
    timing: TimingConfig,
    runtime: Handle,
}

/// Aggregates call activity into a single visual phase.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ProgressIndicator {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ProgressIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressIndicator")
            .field("snapshot", &self.snapshot())
            .field("timing", &self.shared.timing)
            .finish()
    }
}

impl ProgressIndicator {
    /// Create an indicator that schedules its timers on the current Tokio runtime.
    pub fn new(timing: TimingConfig) -> Result<Self, TryCurrentError> {
        Ok(Self::with_runtime(timing, Handle::try_current()?))
    }

    /// Create an indicator that schedules its timers on `runtime`.
    pub fn with_runtime(timing: TimingConfig, runtime: Handle) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Hidden);
        let state = State {
            phase: Phase::Hidden,
            pending: None,
            tokens: TokenSource::default(),
            starts: 0,
            completions: 0,
            torn_down: false,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                phase_tx,
                timing,
                runtime,
            }),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Subscribe to phase changes. The receiver starts at the current phase.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            phase: state.phase,
            starts: state.starts,
            completions: state.completions,
            torn_down: state.torn_down,
        }
    }

    /// The in-flight counter went from 0 to 1.
    pub fn begin(&self) {
        let mut state = self.lock();
        if state.torn_down {
            tracing::trace!("Ignoring call start after teardown");
            return;
        }

        match state.phase {
            Phase::Hidden | Phase::Complete => {
                state.starts += 1;
                self.enter(&mut state, Phase::Start);
                let delay = self.shared.timing.start_debounce();
                self.schedule(&mut state, Phase::Start, Phase::Waiting, delay);
            }
            Phase::Start | Phase::Waiting => {
                tracing::trace!(phase = %state.phase, "Indicator already visible");
            }
        }
    }

    /// The in-flight counter returned to 0.
    pub fn finish(&self) {
        let mut state = self.lock();
        if state.torn_down {
            tracing::trace!("Ignoring call settlement after teardown");
            return;
        }

        match state.phase {
            Phase::Start | Phase::Waiting => {
                state.completions += 1;
                self.enter(&mut state, Phase::Complete);
                let delay = self.shared.timing.hide_delay();
                self.schedule(&mut state, Phase::Complete, Phase::Hidden, delay);
            }
            Phase::Hidden | Phase::Complete => {
                tracing::trace!(phase = %state.phase, "No visible activity to complete");
            }
        }
    }

    /// Stop reacting to activity, cancel any pending transition and hide.
    ///
    /// Idempotent. Signals arriving afterwards are ignored.
    pub fn teardown(&self) {
        let mut state = self.lock();
        if state.torn_down {
            return;
        }
        state.torn_down = true;

        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        if state.phase != Phase::Hidden {
            self.enter(&mut state, Phase::Hidden);
        }

        tracing::debug!(
            starts = state.starts,
            completions = state.completions,
            "Progress indicator torn down"
        );
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, state: &mut State, phase: Phase) {
        let from = std::mem::replace(&mut state.phase, phase);
        tracing::debug!(from = %from, to = %phase, "Progress phase changed");
        metrics::record_phase(phase);
        self.shared.phase_tx.send_replace(phase);
    }

    /// Replace the pending transition with a new one.
    fn schedule(&self, state: &mut State, from: Phase, to: Phase, delay: Duration) {
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }

        let token = state.tokens.issue();
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        tracing::trace!(from = %from, to = %to, delay_ms = delay.as_millis() as u64, "Transition scheduled");

        state.pending = Some(ScheduledTransition::spawn(
            &self.shared.runtime,
            token,
            from,
            to,
            delay,
            move |token| {
                if let Some(shared) = weak.upgrade() {
                    ProgressIndicator { shared }.apply(token);
                }
            },
        ));
    }

    fn apply(&self, token: TransitionToken) {
        let mut state = self.lock();
        let due = !state.torn_down
            && matches!(&state.pending, Some(p) if p.token == token && p.from == state.phase);
        if !due {
            tracing::trace!(?token, "Stale transition ignored");
            return;
        }

        if let Some(transition) = state.pending.take() {
            self.enter(&mut state, transition.to);
        }
    }
}

impl ActivityObserver for ProgressIndicator {
    fn first_call_started(&self) {
        self.begin();
    }

    fn last_call_settled(&self) {
        self.finish();
    }
}

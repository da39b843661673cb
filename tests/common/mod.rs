//! Shared utilities for integration tests.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::service_fn;

use activity_indicator::config::TimingConfig;
use activity_indicator::NetworkSlot;

/// Result a gated call resolves to.
pub type Outcome = Result<&'static str, GateError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateError(pub &'static str);

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A slot whose calls stay pending until the test settles them.
pub type GatedSlot = Arc<NetworkSlot<oneshot::Receiver<Outcome>, &'static str, GateError>>;

/// Slot whose primitive resolves each call with the value sent on its gate.
pub fn gated_slot() -> GatedSlot {
    Arc::new(NetworkSlot::new(service_fn(
        |gate: oneshot::Receiver<Outcome>| async move {
            gate.await.unwrap_or(Err(GateError("gate dropped")))
        },
    )))
}

/// A call issued through a gated slot.
pub struct PendingCall {
    gate: oneshot::Sender<Outcome>,
    pub handle: JoinHandle<Outcome>,
}

impl PendingCall {
    /// Resolve the call and let it run to completion.
    pub async fn settle(self, outcome: Outcome) -> Outcome {
        let _ = self.gate.send(outcome);
        self.handle.await.unwrap()
    }
}

/// Issue one call through `slot` and let it reach the primitive.
pub async fn issue(slot: &GatedSlot) -> PendingCall {
    let (gate, rx) = oneshot::channel();
    let handle = tokio::spawn(slot.fetch(rx));
    run_pending_tasks().await;
    PendingCall { gate, handle }
}

/// Give spawned tasks a chance to run without advancing the clock.
pub async fn run_pending_tasks() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn timing() -> TimingConfig {
    TimingConfig {
        start_debounce_ms: 200,
        hide_delay_ms: 400,
    }
}

//! Installing and removing instrumentation on a slot.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tower::util::BoxCloneSyncService;
use tower::Layer;

use crate::config::TimingConfig;
use crate::intercept::counter::{ActivityCounter, CounterSnapshot};
use crate::intercept::layer::ActivityLayer;
use crate::intercept::slot::{BoxPrimitive, NetworkSlot};
use crate::progress::{Phase, ProgressIndicator, ProgressSnapshot};

/// Errors that can occur while installing instrumentation.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The slot already carries instrumentation.
    #[error("network slot is already instrumented")]
    AlreadyInstrumented,

    /// Phase timers need a Tokio runtime.
    #[error("instrumentation must be installed from within a Tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Live instrumentation of a [`NetworkSlot`].
///
/// Restores the original primitive on [`uninstall`](Self::uninstall) or drop.
pub struct Installation<Req, Resp, E>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    slot: Arc<NetworkSlot<Req, Resp, E>>,
    original: Option<Arc<BoxPrimitive<Req, Resp, E>>>,
    counter: ActivityCounter,
    indicator: ProgressIndicator,
}

impl<Req, Resp, E> fmt::Debug for Installation<Req, Resp, E>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installation")
            .field("active", &self.original.is_some())
            .field("counter", &self.counter)
            .field("indicator", &self.indicator)
            .finish()
    }
}

/// Wrap the primitive currently held by `slot` with activity tracking.
pub fn install<Req, Resp, E>(
    slot: &Arc<NetworkSlot<Req, Resp, E>>,
    timing: TimingConfig,
) -> Result<Installation<Req, Resp, E>, InstallError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    let indicator = ProgressIndicator::new(timing)?;

    if !slot.claim() {
        return Err(InstallError::AlreadyInstrumented);
    }

    let original = slot.current();
    let counter = ActivityCounter::new(Arc::new(indicator.clone()));
    let wrapped = ActivityLayer::new(counter.clone()).layer(BoxPrimitive::clone(&original));
    slot.replace(Arc::new(BoxCloneSyncService::new(wrapped)));

    tracing::info!(
        start_debounce_ms = timing.start_debounce_ms,
        hide_delay_ms = timing.hide_delay_ms,
        "Activity instrumentation installed"
    );

    Ok(Installation {
        slot: Arc::clone(slot),
        original: Some(original),
        counter,
        indicator,
    })
}

impl<Req, Resp, E> Installation<Req, Resp, E>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    /// Current visual phase.
    pub fn phase(&self) -> Phase {
        self.indicator.phase()
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.indicator.subscribe()
    }

    /// Number of intercepted calls not yet settled.
    pub fn in_flight(&self) -> usize {
        self.counter.in_flight()
    }

    pub fn counter(&self) -> CounterSnapshot {
        self.counter.snapshot()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.indicator.snapshot()
    }

    /// Handle on the counter, usable after uninstall.
    pub fn activity_counter(&self) -> ActivityCounter {
        self.counter.clone()
    }

    /// Handle on the indicator, usable after uninstall.
    pub fn indicator(&self) -> ProgressIndicator {
        self.indicator.clone()
    }

    /// Restore the original primitive and tear down the indicator.
    ///
    /// Calls already issued keep their instrumented service and still
    /// settle against this installation's counter.
    pub fn uninstall(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        let Some(original) = self.original.take() else {
            return;
        };

        self.slot.release(original);
        self.indicator.teardown();

        tracing::info!(
            in_flight = self.counter.in_flight(),
            "Activity instrumentation removed"
        );
    }
}

impl<Req, Resp, E> Drop for Installation<Req, Resp, E>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::service_fn;

    fn slot() -> Arc<NetworkSlot<u32, u32, ()>> {
        Arc::new(NetworkSlot::new(service_fn(|n: u32| async move { Ok::<_, ()>(n) })))
    }

    #[tokio::test]
    async fn install_twice_fails() {
        let slot = slot();
        let first = install(&slot, TimingConfig::default()).unwrap();
        assert!(matches!(
            install(&slot, TimingConfig::default()),
            Err(InstallError::AlreadyInstrumented)
        ));

        first.uninstall();
        let again = install(&slot, TimingConfig::default());
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn uninstall_restores_original_pointer() {
        let slot = slot();
        let original = slot.current();

        let installation = install(&slot, TimingConfig::default()).unwrap();
        assert!(!Arc::ptr_eq(&original, &slot.current()));

        installation.uninstall();
        assert!(Arc::ptr_eq(&original, &slot.current()));
        assert!(!slot.is_instrumented());
    }

    #[tokio::test]
    async fn drop_restores_original() {
        let slot = slot();
        let original = slot.current();
        {
            let _installation = install(&slot, TimingConfig::default()).unwrap();
            assert!(slot.is_instrumented());
        }
        assert!(Arc::ptr_eq(&original, &slot.current()));
    }

    #[test]
    fn install_without_runtime_fails() {
        let slot = slot();
        assert!(matches!(
            install(&slot, TimingConfig::default()),
            Err(InstallError::NoRuntime(_))
        ));
        assert!(!slot.is_instrumented());
    }
}

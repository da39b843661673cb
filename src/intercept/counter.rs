//! In-flight call accounting.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::observability::metrics;

/// Global atomic counter for call IDs.
/// Relaxed ordering is enough: we only need uniqueness.
static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an intercepted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u64);

impl CallId {
    pub fn new() -> Self {
        Self(CALL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// How an intercepted call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Success,
    Failure,
    /// The call future was dropped (or panicked) before producing a result.
    Cancelled,
}

impl CallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Cancelled => "cancelled",
        }
    }
}

/// Receives the only two events that drive the visual indicator.
pub trait ActivityObserver: Send + Sync {
    /// The in-flight count went from 0 to 1.
    fn first_call_started(&self);

    /// The in-flight count returned to 0.
    fn last_call_settled(&self);
}

/// Cumulative totals plus the current in-flight count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub in_flight: usize,
    pub issued: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
}

struct Inner {
    in_flight: Mutex<usize>,
    issued: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    observer: Arc<dyn ActivityObserver>,
}

/// Counts calls issued but not yet settled.
///
/// Cheap to clone; all clones share the same count.
#[derive(Clone)]
pub struct ActivityCounter {
    inner: Arc<Inner>,
}

impl fmt::Debug for ActivityCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityCounter")
            .field("snapshot", &self.snapshot())
            .field("observer", &"<dyn ActivityObserver>")
            .finish()
    }
}

impl ActivityCounter {
    pub fn new(observer: Arc<dyn ActivityObserver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                in_flight: Mutex::new(0),
                issued: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                cancelled: AtomicU64::new(0),
                observer,
            }),
        }
    }

    /// Number of calls issued but not yet settled.
    pub fn in_flight(&self) -> usize {
        *self.lock()
    }

    /// Totals only change under the in-flight lock, so a snapshot always
    /// satisfies `succeeded + failed + cancelled + in_flight == issued`.
    pub fn snapshot(&self) -> CounterSnapshot {
        let in_flight = self.lock();
        CounterSnapshot {
            in_flight: *in_flight,
            issued: self.inner.issued.load(Ordering::Relaxed),
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            cancelled: self.inner.cancelled.load(Ordering::Relaxed),
        }
    }

    /// Record a new call. The returned guard settles it exactly once.
    pub fn acquire(&self) -> CallGuard {
        let id = CallId::new();
        let mut in_flight = self.lock();
        *in_flight += 1;
        self.inner.issued.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(call_id = %id, in_flight = *in_flight, "Call issued");
        metrics::record_in_flight(*in_flight);

        if *in_flight == 1 {
            self.inner.observer.first_call_started();
        }
        drop(in_flight);

        CallGuard {
            counter: self.clone(),
            id,
            started: Instant::now(),
            settled: false,
        }
    }

    fn release(&self, id: CallId, outcome: CallOutcome, started: Instant) {
        metrics::record_call(outcome.as_str(), started);

        let mut in_flight = self.lock();
        let Some(remaining) = in_flight.checked_sub(1) else {
            tracing::error!(call_id = %id, "Call settled with no calls in flight");
            return;
        };
        *in_flight = remaining;

        let total = match outcome {
            CallOutcome::Success => &self.inner.succeeded,
            CallOutcome::Failure => &self.inner.failed,
            CallOutcome::Cancelled => &self.inner.cancelled,
        };
        total.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(
            call_id = %id,
            outcome = outcome.as_str(),
            in_flight = remaining,
            "Call settled"
        );
        metrics::record_in_flight(remaining);

        if remaining == 0 {
            self.inner.observer.last_call_settled();
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tracks one in-flight call. Settles as cancelled when dropped unsettled.
#[derive(Debug)]
pub struct CallGuard {
    counter: ActivityCounter,
    id: CallId,
    started: Instant,
    settled: bool,
}

impl CallGuard {
    /// Settle the call. Later calls, and the drop, are no-ops.
    pub fn settle(&mut self, outcome: CallOutcome) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.counter.release(self.id, outcome, self.started);
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.settle(CallOutcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<&'static str>>,
    }

    impl ActivityObserver for Recorder {
        fn first_call_started(&self) {
            self.events.lock().unwrap().push("first");
        }

        fn last_call_settled(&self) {
            self.events.lock().unwrap().push("last");
        }
    }

    fn counter() -> (ActivityCounter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (ActivityCounter::new(recorder.clone()), recorder)
    }

    #[test]
    fn call_id_unique() {
        assert_ne!(CallId::new(), CallId::new());
    }

    #[test]
    fn signals_only_on_edges() {
        let (counter, recorder) = counter();

        let mut a = counter.acquire();
        let mut b = counter.acquire();
        let c = counter.acquire();
        assert_eq!(counter.in_flight(), 3);

        a.settle(CallOutcome::Success);
        b.settle(CallOutcome::Failure);
        assert_eq!(counter.in_flight(), 1);
        drop(c);

        assert_eq!(counter.in_flight(), 0);
        assert_eq!(*recorder.events.lock().unwrap(), vec!["first", "last"]);

        let snapshot = counter.snapshot();
        assert_eq!(snapshot.issued, 3);
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.cancelled, 1);
    }

    #[test]
    fn settle_is_exactly_once() {
        let (counter, recorder) = counter();

        let mut guard = counter.acquire();
        guard.settle(CallOutcome::Failure);
        guard.settle(CallOutcome::Success);
        drop(guard);

        assert_eq!(counter.in_flight(), 0);
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.succeeded + snapshot.cancelled, 0);
        assert_eq!(recorder.events.lock().unwrap().len(), 2);
    }

    #[test]
    fn snapshots_stay_consistent_across_threads() {
        let (counter, _recorder) = counter();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let mut guard = counter.acquire();
                        if i % 2 == 0 {
                            guard.settle(CallOutcome::Success);
                        }
                    }
                })
            })
            .collect();

        while workers.iter().any(|w| !w.is_finished()) {
            let s = counter.snapshot();
            assert_eq!(
                s.succeeded + s.failed + s.cancelled + s.in_flight as u64,
                s.issued
            );
        }
        for worker in workers {
            worker.join().unwrap();
        }

        let s = counter.snapshot();
        assert_eq!(s.issued, 2_000);
        assert_eq!(s.succeeded, 1_000);
        assert_eq!(s.cancelled, 1_000);
        assert_eq!(s.in_flight, 0);
    }

    #[test]
    fn oscillation_signals_each_cycle() {
        let (counter, recorder) = counter();

        for _ in 0..3 {
            let mut guard = counter.acquire();
            guard.settle(CallOutcome::Success);
        }

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["first", "last", "first", "last", "first", "last"]
        );
    }
}

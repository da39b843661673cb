//! Simulated primitive with random latency and failures.

use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tower::service_fn;
use tower::util::BoxCloneSyncService;

use crate::intercept::BoxPrimitive;

/// One simulated call: how long it takes and whether it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedCall {
    pub id: usize,
    pub latency: Duration,
    pub fail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("simulated call {id} failed after {latency:?}")]
pub struct SimulatedError {
    pub id: usize,
    pub latency: Duration,
}

/// Shape of a generated batch of calls.
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub calls: usize,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Probability in `0.0..=1.0` that a call fails.
    pub failure_rate: f64,
}

/// Sleeps for the call's latency, then succeeds with it or fails.
pub fn primitive() -> BoxPrimitive<SimulatedCall, Duration, SimulatedError> {
    BoxCloneSyncService::new(service_fn(|call: SimulatedCall| async move {
        tokio::time::sleep(call.latency).await;
        if call.fail {
            Err(SimulatedError {
                id: call.id,
                latency: call.latency,
            })
        } else {
            Ok(call.latency)
        }
    }))
}

/// Generate `workload.calls` calls using `rng`.
pub fn generate<R: Rng>(workload: &Workload, rng: &mut R) -> Vec<SimulatedCall> {
    let low = workload.min_latency_ms.min(workload.max_latency_ms);
    let high = workload.min_latency_ms.max(workload.max_latency_ms);
    let failure_rate = workload.failure_rate.clamp(0.0, 1.0);

    (0..workload.calls)
        .map(|id| SimulatedCall {
            id,
            latency: Duration::from_millis(rng.gen_range(low..=high)),
            fail: rng.gen_bool(failure_rate),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tower::ServiceExt;

    #[test]
    fn generated_calls_respect_bounds() {
        let workload = Workload {
            calls: 50,
            min_latency_ms: 10,
            max_latency_ms: 30,
            failure_rate: 0.0,
        };
        let calls = generate(&workload, &mut StdRng::seed_from_u64(7));

        assert_eq!(calls.len(), 50);
        assert!(calls.iter().all(|c| !c.fail));
        assert!(calls
            .iter()
            .all(|c| (10..=30).contains(&(c.latency.as_millis() as u64))));
    }

    #[test]
    fn failure_rate_is_clamped() {
        let workload = Workload {
            calls: 5,
            min_latency_ms: 1,
            max_latency_ms: 1,
            failure_rate: 3.0,
        };
        let calls = generate(&workload, &mut StdRng::seed_from_u64(1));
        assert!(calls.iter().all(|c| c.fail));
    }

    #[tokio::test(start_paused = true)]
    async fn primitive_reports_outcome() {
        let ok = SimulatedCall {
            id: 1,
            latency: Duration::from_millis(100),
            fail: false,
        };
        let bad = SimulatedCall { fail: true, ..ok };

        assert_eq!(primitive().oneshot(ok).await, Ok(ok.latency));
        assert_eq!(
            primitive().oneshot(bad).await,
            Err(SimulatedError {
                id: 1,
                latency: ok.latency
            })
        );
    }
}

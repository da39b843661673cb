//! Delayed phase transitions.
//!
//! A transition is scheduled as a Tokio task that sleeps and then asks the
//! indicator to apply it. The indicator only honours the request if the token
//! still matches the one it recorded at schedule time.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::progress::phase::Phase;

/// Identifies one scheduled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionToken(u64);

/// Hands out fresh tokens. Tokens are never reused within one indicator.
#[derive(Debug, Default)]
pub struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub fn issue(&mut self) -> TransitionToken {
        self.next += 1;
        TransitionToken(self.next)
    }
}

/// A transition waiting for its delay to elapse.
#[derive(Debug)]
pub struct ScheduledTransition {
    pub token: TransitionToken,
    pub from: Phase,
    pub to: Phase,
    handle: JoinHandle<()>,
}

impl ScheduledTransition {
    /// Spawn `on_elapsed` on `runtime` after `delay`.
    pub fn spawn<F>(
        runtime: &Handle,
        token: TransitionToken,
        from: Phase,
        to: Phase,
        delay: Duration,
        on_elapsed: F,
    ) -> Self
    where
        F: FnOnce(TransitionToken) + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_elapsed(token);
        });

        Self {
            token,
            from,
            to,
            handle,
        }
    }

    /// Abort the timer task. The token is invalid from here on.
    pub fn cancel(self) {
        tracing::trace!(from = %self.from, to = %self.to, "Scheduled transition cancelled");
        self.handle.abort();
    }
}

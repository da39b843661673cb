//! Tower middleware that counts in-flight calls.

use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tower::{Layer, Service};

use crate::intercept::counter::{ActivityCounter, CallGuard, CallOutcome};

/// Wraps a service so every call is tracked by an [`ActivityCounter`].
#[derive(Debug, Clone)]
pub struct ActivityLayer {
    counter: ActivityCounter,
}

impl ActivityLayer {
    pub fn new(counter: ActivityCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &ActivityCounter {
        &self.counter
    }
}

impl<S> Layer<S> for ActivityLayer {
    type Service = ActivityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ActivityService {
            inner,
            counter: self.counter.clone(),
        }
    }
}

/// Service produced by [`ActivityLayer`].
///
/// Same request, response and error types as the wrapped service.
#[derive(Debug, Clone)]
pub struct ActivityService<S> {
    inner: S,
    counter: ActivityCounter,
}

impl<S, Req> Service<Req> for ActivityService<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ActivityFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Req) -> Self::Future {
        let guard = self.counter.acquire();
        ActivityFuture {
            inner: Box::pin(self.inner.call(request)),
            guard: Some(guard),
        }
    }
}

/// Response future for [`ActivityService`].
///
/// Settles its call when the inner future resolves; if dropped first, the
/// guard settles it as cancelled.
pub struct ActivityFuture<F> {
    inner: Pin<Box<F>>,
    guard: Option<CallGuard>,
}

impl<F, T, E> Future for ActivityFuture<F>
where
    F: Future<Output = Result<T, E>>,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let output = ready!(this.inner.as_mut().poll(cx));

        if let Some(mut guard) = this.guard.take() {
            let outcome = if output.is_ok() {
                CallOutcome::Success
            } else {
                CallOutcome::Failure
            };
            guard.settle(outcome);
        }

        Poll::Ready(output)
    }
}

//! The shared network entry point.
//!
//! Every component issues its calls through one [`NetworkSlot`]. The slot
//! holds a boxed service behind an atomic pointer so instrumentation can be
//! installed and removed while calls are running.

use arc_swap::ArcSwap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceExt};

/// Type-erased network primitive stored in a slot.
pub type BoxPrimitive<Req, Resp, E> = BoxCloneSyncService<Req, Resp, E>;

/// Swappable holder for the process-wide network primitive.
pub struct NetworkSlot<Req, Resp, E> {
    current: ArcSwap<BoxPrimitive<Req, Resp, E>>,
    instrumented: AtomicBool,
}

impl<Req, Resp, E> fmt::Debug for NetworkSlot<Req, Resp, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSlot")
            .field("instrumented", &self.instrumented.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<Req, Resp, E> NetworkSlot<Req, Resp, E>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Send + 'static,
{
    /// Create a slot holding `primitive`.
    pub fn new<S>(primitive: S) -> Self
    where
        S: Service<Req, Response = Resp, Error = E> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        Self::from_boxed(Arc::new(BoxCloneSyncService::new(primitive)))
    }

    pub fn from_boxed(primitive: Arc<BoxPrimitive<Req, Resp, E>>) -> Self {
        Self {
            current: ArcSwap::new(primitive),
            instrumented: AtomicBool::new(false),
        }
    }

    /// Issue a call through whatever primitive the slot holds right now.
    ///
    /// The primitive is captured when `fetch` is invoked, so swapping the
    /// slot afterwards does not affect this call.
    pub fn fetch(&self, request: Req) -> impl Future<Output = Result<Resp, E>> + Send + 'static {
        let mut primitive = BoxPrimitive::clone(&self.current.load());
        async move { primitive.ready().await?.call(request).await }
    }

    /// Whether instrumentation is currently installed.
    pub fn is_instrumented(&self) -> bool {
        self.instrumented.load(Ordering::Acquire)
    }

    /// The primitive new calls will use.
    pub fn current(&self) -> Arc<BoxPrimitive<Req, Resp, E>> {
        self.current.load_full()
    }

    /// Claim the slot for instrumentation. Fails if already claimed.
    pub(crate) fn claim(&self) -> bool {
        self.instrumented
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn replace(&self, primitive: Arc<BoxPrimitive<Req, Resp, E>>) {
        self.current.store(primitive);
    }

    pub(crate) fn release(&self, original: Arc<BoxPrimitive<Req, Resp, E>>) {
        self.current.store(original);
        self.instrumented.store(false, Ordering::Release);
    }
}

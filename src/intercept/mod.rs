//! Network call interception subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → slot.rs (NetworkSlot::fetch snapshots the current service)
//!     → layer.rs (ActivityService::call)
//!         → counter.rs (acquire: in-flight += 1, signal on 0 → 1)
//!         → inner service, request unmodified
//!         → counter.rs (CallGuard settles: in-flight -= 1, signal on → 0)
//!     → result returned to the caller unmodified
//!
//! install.rs:
//!     capture original → store wrapped service → Installation handle
//!     uninstall / drop → restore original → tear down indicator
//! ```
//!
//! # Design Decisions
//! - Instrumentation is a tower Layer, usable with or without a slot
//! - Each call settles exactly once through an RAII guard (success, error,
//!   panic, or the future being dropped)
//! - Phase signals are emitted while the counter lock is held, so they are
//!   ordered exactly like the counter transitions
//! - Uninstall never cancels in-flight calls

pub mod counter;
pub mod install;
pub mod layer;
pub mod slot;

pub use counter::{ActivityCounter, ActivityObserver, CallGuard, CallId, CallOutcome, CounterSnapshot};
pub use install::{install, InstallError, Installation};
pub use layer::{ActivityFuture, ActivityLayer, ActivityService};
pub use slot::{BoxPrimitive, NetworkSlot};

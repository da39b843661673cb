//! Global network-activity progress indicator.
//!
//! Observes every call issued through a shared [`NetworkSlot`], aggregates
//! overlapping calls into a single in-flight count, and drives a
//! `start → waiting → complete → hidden` phase that a renderer can follow.

pub mod config;
pub mod intercept;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod progress;
pub mod render;

pub use config::IndicatorConfig;
pub use intercept::{install, ActivityLayer, InstallError, Installation, NetworkSlot};
pub use lifecycle::Shutdown;
pub use progress::{Phase, ProgressIndicator};

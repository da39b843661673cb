//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! intercept + progress produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (in-flight gauge, call counters, phase transitions)
//!
//! Consumers:
//!     → stderr (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (call_id, in_flight, phase) on every event
//! - Metric updates go through the `metrics` facade and are no-ops
//!   until a recorder is installed

pub mod logging;
pub mod metrics;

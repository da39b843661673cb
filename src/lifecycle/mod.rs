//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Session (session.rs):
//!     install instrumentation → spawn renderer → issue calls
//!     → wait for the indicator to hide → uninstall → stop renderer
//!
//! Shutdown (shutdown.rs):
//!     trigger → renderer and session observe it and stop
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Uninstall happens before the renderer stops, so the last frame is Hidden
//! - An interrupted session drops its pending calls; they settle as cancelled

pub mod session;
pub mod shutdown;
pub mod signals;

pub use session::{run_session, SessionOptions, SessionSummary};
pub use shutdown::Shutdown;

//! Progress state machine subsystem.
//!
//! # States
//! - Hidden: nothing in flight, bar not drawn
//! - Start: first call issued, fast initial jump
//! - Waiting: calls still running, lingering state
//! - Complete: everything settled, finishing animation
//!
//! # State Transitions
//! ```text
//! Hidden   → Start:    in-flight counter 0 → 1
//! Start    → Waiting:  after start_debounce (timer)
//! Start    → Complete: in-flight counter → 0
//! Waiting  → Complete: in-flight counter → 0
//! Complete → Hidden:   after hide_delay (timer)
//! Complete → Start:    in-flight counter 0 → 1 during the hide window
//! ```
//!
//! # Design Decisions
//! - Only the first-call-in and last-call-out signals drive phase changes
//! - At most one scheduled transition exists at any time
//! - Scheduled transitions carry a token; stale tokens never fire
//! - Teardown aborts pending timers and freezes the phase at Hidden

pub mod indicator;
pub mod phase;
pub mod timer;

pub use indicator::{ProgressIndicator, ProgressSnapshot};
pub use phase::Phase;

//! Network primitives that can be placed in a slot.
//!
//! # Data Flow
//! ```text
//! http.rs:      reqwest::Request → reqwest::Client::execute → reqwest::Response
//! simulated.rs: SimulatedCall → sleep(latency) → Ok(latency) | Err(SimulatedError)
//! ```
//!
//! # Design Decisions
//! - Both primitives are plain tower services, boxed for the slot
//! - Neither retries nor caches; a call's outcome is its only output

pub mod http;
pub mod simulated;

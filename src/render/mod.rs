//! Rendering layer.
//!
//! # Data Flow
//! ```text
//! ProgressIndicator (watch::Sender<Phase>)
//!     → follow.rs (await phase changes until shutdown)
//!     → bar.rs (phase → 0..100% text bar)
//!     → terminal (carriage return, redraw in place)
//! ```

pub mod bar;
pub mod follow;

pub use bar::render_bar;
pub use follow::follow;

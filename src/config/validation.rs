//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, widths usable)
//! - Validate addresses the binary will bind
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: IndicatorConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::IndicatorConfig;

/// Longest delay accepted for any automatic phase transition.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Narrowest bar that still shows distinct phases.
pub const MIN_BAR_WIDTH: usize = 10;

/// Widest bar the renderer accepts.
pub const MAX_BAR_WIDTH: usize = 500;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be between 1 and {max} ms (got {value})", max = MAX_DELAY_MS)]
    DelayOutOfRange { field: &'static str, value: u64 },

    #[error("render.bar_width must be at least {min} (got {0})", min = MIN_BAR_WIDTH)]
    BarTooNarrow(usize),

    #[error("render.bar_width must be at most {max} (got {0})", max = MAX_BAR_WIDTH)]
    BarTooWide(usize),

    #[error("client.timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("client.max_concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &IndicatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_delay(&mut errors, "timing.start_debounce_ms", config.timing.start_debounce_ms);
    check_delay(&mut errors, "timing.hide_delay_ms", config.timing.hide_delay_ms);

    if config.render.bar_width < MIN_BAR_WIDTH {
        errors.push(ValidationError::BarTooNarrow(config.render.bar_width));
    } else if config.render.bar_width > MAX_BAR_WIDTH {
        errors.push(ValidationError::BarTooWide(config.render.bar_width));
    }

    if config.client.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.client.max_concurrency == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_delay(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 || value > MAX_DELAY_MS {
        errors.push(ValidationError::DelayOutOfRange { field, value });
    }
}

//! Visual phase of the activity indicator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current stage of the indicator's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Hidden,
    Start,
    Waiting,
    Complete,
}

impl Phase {
    /// Whether the rendering layer should draw anything.
    pub fn is_visible(self) -> bool {
        self != Phase::Hidden
    }

    /// Width of the bar, as a percentage, the renderer should animate towards.
    pub fn percent(self) -> u8 {
        match self {
            Phase::Hidden => 0,
            Phase::Start => 20,
            Phase::Waiting => 80,
            Phase::Complete => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Hidden => "hidden",
            Phase::Start => "start",
            Phase::Waiting => "waiting",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

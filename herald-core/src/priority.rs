//! Listener priorities.

use std::{fmt, str::FromStr};

/// Execution priority of a subscription.
///
/// Earlier variants run first. [`Priority::Monitor`] is a reserved tier that
/// always runs after every other subscription of a dispatch pass; it exists to
/// observe the final outcome, not to change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Priority {
    /// Runs first.
    Highest,
    /// Runs after [`Priority::Highest`].
    High,
    /// The default tier.
    #[default]
    Normal,
    /// Runs after [`Priority::Normal`].
    Low,
    /// Last tier able to change the outcome.
    Lowest,
    /// Observation tier; always trails every other tier.
    Monitor,
}

impl Priority {
    /// All priorities in execution order.
    pub const ALL: [Priority; 6] = [
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lowest,
        Priority::Monitor,
    ];

    /// Position in execution order (`Highest` is 0).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Whether this is the trailing monitor tier.
    pub const fn is_monitor(self) -> bool {
        matches!(self, Priority::Monitor)
    }

    /// Whether a subscription at `self` runs strictly before one at `other`.
    pub const fn runs_before(self, other: Priority) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// Upper-case name, as used in logs and `Display`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Highest => "HIGHEST",
            Priority::High => "HIGH",
            Priority::Normal => "NORMAL",
            Priority::Low => "LOW",
            Priority::Lowest => "LOWEST",
            Priority::Monitor => "MONITOR",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown priority name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

//! How an embedding host surfaces listener failures

use serde::{Deserialize, Serialize};

/// What a host does with the failures collected during one emission.
///
/// Either way the emission itself already ran every listener; the policy
/// only decides how the failures reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerFailurePolicy {
    /// Re-raise a single error summarising all failures (default).
    #[default]
    Raise,
    /// Log each failure and report the invoked count as success.
    Log,
}

impl ListenerFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raise => "raise",
            Self::Log => "log",
        }
    }
}

impl std::str::FromStr for ListenerFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raise" => Ok(Self::Raise),
            "log" => Ok(Self::Log),
            other => Err(format!(
                "unknown listener failure policy: '{}' (expected 'raise' or 'log')",
                other
            )),
        }
    }
}

impl std::fmt::Display for ListenerFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

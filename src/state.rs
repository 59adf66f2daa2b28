//! Process states as reported by supervisord.
//!
//! The listener never enforces transition rules; these codes only give
//! handlers a typed view of the labels carried in `PROCESS_STATE_*` events.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DecodeError;

/// Supervisord process state with its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStateCode {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessStateCode {
    /// All states in code order.
    pub const ALL: [ProcessStateCode; 8] = [
        Self::Stopped,
        Self::Starting,
        Self::Running,
        Self::Backoff,
        Self::Stopping,
        Self::Exited,
        Self::Fatal,
        Self::Unknown,
    ];

    /// Numeric code used by the control-plane API.
    pub fn code(self) -> i64 {
        match self {
            Self::Stopped => 0,
            Self::Starting => 10,
            Self::Running => 20,
            Self::Backoff => 30,
            Self::Stopping => 40,
            Self::Exited => 100,
            Self::Fatal => 200,
            Self::Unknown => 1000,
        }
    }

    /// Look up a state by numeric code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    /// Upper-case label as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Backoff => "BACKOFF",
            Self::Stopping => "STOPPING",
            Self::Exited => "EXITED",
            Self::Fatal => "FATAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProcessStateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProcessStateCode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| DecodeError::UnknownProcessState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ProcessStateCode::Stopped.code(), 0);
        assert_eq!(ProcessStateCode::Running.code(), 20);
        assert_eq!(ProcessStateCode::Exited.code(), 100);
        assert_eq!(ProcessStateCode::Unknown.code(), 1000);
    }

    #[test]
    fn test_ordering_follows_codes() {
        for pair in ProcessStateCode::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].code() < pair[1].code());
        }
    }

    #[test]
    fn test_name_and_code_lookup() {
        for state in ProcessStateCode::ALL {
            assert_eq!(state.name().parse::<ProcessStateCode>().unwrap(), state);
            assert_eq!(ProcessStateCode::from_code(state.code()), Some(state));
        }
        assert_eq!(ProcessStateCode::from_code(5), None);
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert_eq!(
            "running".parse::<ProcessStateCode>(),
            Err(DecodeError::UnknownProcessState("running".to_string()))
        );
    }
}

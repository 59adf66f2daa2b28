//! Event categories and their event-name prefixes.

use serde::Serialize;

/// Prefix of process state transition events (`PROCESS_STATE_RUNNING`, ...).
pub const PROCESS_STATE_PREFIX: &str = "PROCESS_STATE";
/// Prefix of remote communication events.
pub const REMOTE_COMMUNICATION_PREFIX: &str = "REMOTE_COMMUNICATION";
/// Prefix of process log events (`PROCESS_LOG_STDOUT`, ...).
pub const PROCESS_LOG_PREFIX: &str = "PROCESS_LOG";
/// Prefix of supervisord's own state changes.
pub const SUPERVISOR_STATE_CHANGE_PREFIX: &str = "SUPERVISOR_STATE_CHANGE";
/// Prefix of periodic tick events (`TICK_5`, `TICK_60`, `TICK_3600`).
pub const TICK_PREFIX: &str = "TICK";

/// One of the recognized event categories.
///
/// A category determines both the payload shape and the handler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// `PROCESS_STATE*`
    ProcessState,
    /// `REMOTE_COMMUNICATION*`
    RemoteCommunication,
    /// `PROCESS_LOG*`
    ProcessLog,
    /// `SUPERVISOR_STATE_CHANGE*`
    SupervisorStateChange,
    /// `TICK*`
    Tick,
}

impl EventCategory {
    /// All categories in matching priority order.
    pub const ALL: [EventCategory; 5] = [
        EventCategory::ProcessState,
        EventCategory::RemoteCommunication,
        EventCategory::ProcessLog,
        EventCategory::SupervisorStateChange,
        EventCategory::Tick,
    ];

    /// Event-name prefix for this category.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::ProcessState => PROCESS_STATE_PREFIX,
            Self::RemoteCommunication => REMOTE_COMMUNICATION_PREFIX,
            Self::ProcessLog => PROCESS_LOG_PREFIX,
            Self::SupervisorStateChange => SUPERVISOR_STATE_CHANGE_PREFIX,
            Self::Tick => TICK_PREFIX,
        }
    }

    /// Match an event name against the known prefixes, first hit wins.
    ///
    /// ```
    /// use supervisor_listener::protocol::EventCategory;
    ///
    /// assert_eq!(
    ///     EventCategory::from_event_name("PROCESS_STATE_STOPPED"),
    ///     Some(EventCategory::ProcessState)
    /// );
    /// assert_eq!(EventCategory::from_event_name("CUSTOM_EVENT"), None);
    /// ```
    pub fn from_event_name(event_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| event_name.starts_with(category.prefix()))
    }

    /// Part of the event name after the prefix and its `_` separator.
    ///
    /// Returns `None` when the name does not carry this prefix or has no
    /// suffix.
    pub fn suffix(self, event_name: &str) -> Option<&str> {
        let rest = event_name.strip_prefix(self.prefix())?;
        let rest = rest.strip_prefix('_').unwrap_or(rest);
        (!rest.is_empty()).then_some(rest)
    }
}

//! Typed event payloads.
//!
//! The payload shape is selected by the event category. Two layouts exist:
//!
//! - token payloads (`PROCESS_STATE*`, `TICK*`): the whole body is
//!   `key:value` tokens, trailing whitespace trimmed.
//! - token line + data (`PROCESS_LOG*`, `REMOTE_COMMUNICATION*`): the first
//!   line is tokens, everything after the first `\n` is raw data.
//!
//! Every field of a variant is required. Unknown keys are ignored.

use bytes::Bytes;
use serde::Serialize;

use super::category::EventCategory;
use super::tokens::TokenMap;
use crate::error::DecodeError;
use crate::state::ProcessStateCode;

/// A payload type bound to one event category.
pub trait EventPayload: Sized + Send + 'static {
    /// Category whose events carry this payload.
    const CATEGORY: EventCategory;

    /// Decode the raw payload body.
    fn decode(payload: &Bytes) -> Result<Self, DecodeError>;
}

/// Body of a `PROCESS_STATE_*` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStateEvent {
    pub process_name: String,
    pub group_name: String,
    /// Label of the state the process left.
    pub from_state: String,
    pub pid: u32,
    /// Whether an exit was expected (exit code listed in `exitcodes`).
    pub expected: bool,
    /// Start attempts so far.
    pub tries: u32,
}

impl ProcessStateEvent {
    /// Typed view of `from_state`.
    pub fn from_state_code(&self) -> Option<ProcessStateCode> {
        self.from_state.parse().ok()
    }
}

impl EventPayload for ProcessStateEvent {
    const CATEGORY: EventCategory = EventCategory::ProcessState;

    fn decode(payload: &Bytes) -> Result<Self, DecodeError> {
        let tokens = TokenMap::parse_bytes(payload)?;
        Ok(Self {
            process_name: tokens.require_string("processname")?,
            group_name: tokens.require_string("groupname")?,
            from_state: tokens.require_string("from_state")?,
            pid: tokens.require_int("pid")?,
            expected: tokens.require_bool("expected")?,
            tries: tokens.require_int("tries")?,
        })
    }
}

/// Body of a `TICK_*` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickEvent {
    /// Epoch seconds at the start of the tick interval.
    pub when: u64,
}

impl EventPayload for TickEvent {
    const CATEGORY: EventCategory = EventCategory::Tick;

    fn decode(payload: &Bytes) -> Result<Self, DecodeError> {
        let tokens = TokenMap::parse_bytes(payload)?;
        Ok(Self {
            when: tokens.require_int("when")?,
        })
    }
}

/// Body of a `PROCESS_LOG_*` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessLogEvent {
    pub process_name: String,
    pub group_name: String,
    pub pid: u32,
    /// `stdout` or `stderr`.
    pub channel: String,
    /// Raw log output.
    pub data: Bytes,
}

impl EventPayload for ProcessLogEvent {
    const CATEGORY: EventCategory = EventCategory::ProcessLog;

    fn decode(payload: &Bytes) -> Result<Self, DecodeError> {
        let (head, data) = split_token_line(payload);
        let tokens = TokenMap::parse_bytes(&head)?;
        Ok(Self {
            process_name: tokens.require_string("processname")?,
            group_name: tokens.require_string("groupname")?,
            pid: tokens.require_int("pid")?,
            channel: tokens.require_string("channel")?,
            data,
        })
    }
}

/// Body of a `REMOTE_COMMUNICATION` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteCommunicationEvent {
    /// Caller-defined type tag.
    pub kind: String,
    pub data: Bytes,
}

impl EventPayload for RemoteCommunicationEvent {
    const CATEGORY: EventCategory = EventCategory::RemoteCommunication;

    fn decode(payload: &Bytes) -> Result<Self, DecodeError> {
        let (head, data) = split_token_line(payload);
        let tokens = TokenMap::parse_bytes(&head)?;
        Ok(Self {
            kind: tokens.require_string("type")?,
            data,
        })
    }
}

/// Body of a `SUPERVISOR_STATE_CHANGE_*` event. Carries no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupervisorStateChangeEvent;

impl EventPayload for SupervisorStateChangeEvent {
    const CATEGORY: EventCategory = EventCategory::SupervisorStateChange;

    fn decode(_payload: &Bytes) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}

/// Any decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Event {
    ProcessState(ProcessStateEvent),
    RemoteCommunication(RemoteCommunicationEvent),
    ProcessLog(ProcessLogEvent),
    SupervisorStateChange(SupervisorStateChangeEvent),
    Tick(TickEvent),
}

impl Event {
    /// Decode a payload for the given category.
    pub fn decode(category: EventCategory, payload: &Bytes) -> Result<Self, DecodeError> {
        Ok(match category {
            EventCategory::ProcessState => Self::ProcessState(ProcessStateEvent::decode(payload)?),
            EventCategory::RemoteCommunication => {
                Self::RemoteCommunication(RemoteCommunicationEvent::decode(payload)?)
            }
            EventCategory::ProcessLog => Self::ProcessLog(ProcessLogEvent::decode(payload)?),
            EventCategory::SupervisorStateChange => {
                Self::SupervisorStateChange(SupervisorStateChangeEvent::decode(payload)?)
            }
            EventCategory::Tick => Self::Tick(TickEvent::decode(payload)?),
        })
    }

    /// Category of this payload.
    pub fn category(&self) -> EventCategory {
        match self {
            Self::ProcessState(_) => ProcessStateEvent::CATEGORY,
            Self::RemoteCommunication(_) => RemoteCommunicationEvent::CATEGORY,
            Self::ProcessLog(_) => ProcessLogEvent::CATEGORY,
            Self::SupervisorStateChange(_) => SupervisorStateChangeEvent::CATEGORY,
            Self::Tick(_) => TickEvent::CATEGORY,
        }
    }
}

/// Split at the first `\n` into token line and data (zero-copy).
fn split_token_line(payload: &Bytes) -> (Bytes, Bytes) {
    match payload.iter().position(|&b| b == b'\n') {
        Some(idx) => (payload.slice(..idx), payload.slice(idx + 1..)),
        None => (payload.clone(), Bytes::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn test_decode_process_state() {
        let payload = bytes("processname:cat groupname:cat from_state:STOPPED tries:0 expected:1 pid:2456");
        let event = ProcessStateEvent::decode(&payload).unwrap();

        assert_eq!(event.process_name, "cat");
        assert_eq!(event.group_name, "cat");
        assert_eq!(event.from_state, "STOPPED");
        assert_eq!(event.tries, 0);
        assert!(event.expected);
        assert_eq!(event.pid, 2456);
        assert_eq!(event.from_state_code(), Some(ProcessStateCode::Stopped));
    }

    #[test]
    fn test_process_state_missing_field() {
        let payload = bytes("processname:cat groupname:cat from_state:STOPPED tries:0 pid:2456");
        assert_eq!(
            ProcessStateEvent::decode(&payload),
            Err(DecodeError::MissingKey("expected"))
        );
    }

    #[test]
    fn test_process_state_ambiguous_bool_rejected() {
        let payload =
            bytes("processname:cat groupname:cat from_state:STOPPED tries:0 expected:2 pid:1");
        assert!(matches!(
            ProcessStateEvent::decode(&payload),
            Err(DecodeError::InvalidBool { key: "expected", .. })
        ));
    }

    #[test]
    fn test_decode_tick_with_trailing_newline() {
        let event = TickEvent::decode(&bytes("when:1700000000\n")).unwrap();
        assert_eq!(event.when, 1_700_000_000);
    }

    #[test]
    fn test_decode_process_log() {
        let payload = bytes("processname:web groupname:web pid:42 channel:stdout\nline one\nline two\n");
        let event = ProcessLogEvent::decode(&payload).unwrap();

        assert_eq!(event.process_name, "web");
        assert_eq!(event.pid, 42);
        assert_eq!(event.channel, "stdout");
        assert_eq!(&event.data[..], b"line one\nline two\n");
    }

    #[test]
    fn test_decode_remote_communication() {
        let event = RemoteCommunicationEvent::decode(&bytes("type:reload\n{\"force\":true}")).unwrap();
        assert_eq!(event.kind, "reload");
        assert_eq!(&event.data[..], b"{\"force\":true}");

        let bare = RemoteCommunicationEvent::decode(&bytes("type:ping")).unwrap();
        assert!(bare.data.is_empty());
    }

    #[test]
    fn test_supervisor_state_change_accepts_any_body() {
        assert!(SupervisorStateChangeEvent::decode(&Bytes::new()).is_ok());
        assert!(SupervisorStateChangeEvent::decode(&bytes("anything")).is_ok());
    }

    #[test]
    fn test_event_decode_dispatches_on_category() {
        let event = Event::decode(EventCategory::Tick, &bytes("when:5")).unwrap();
        assert_eq!(event, Event::Tick(TickEvent { when: 5 }));
        assert_eq!(event.category(), EventCategory::Tick);

        let err = Event::decode(EventCategory::ProcessState, &bytes("when:5")).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKey(_)));
    }

    #[test]
    fn test_empty_payload_for_token_category_fails() {
        assert!(ProcessStateEvent::decode(&Bytes::new()).is_err());
        assert!(TickEvent::decode(&Bytes::new()).is_err());
    }
}

//! Protocol module - event framing, token decoding and acknowledgments.
//!
//! This module implements the supervisord event listener protocol:
//! - header line codec ([`Header`])
//! - typed payload decoding ([`Event`] and the per-category payloads)
//! - acknowledgment frames ([`EventResult`])

mod category;
mod frame;
mod header;
mod payload;
mod result;
mod tokens;

pub use category::{
    EventCategory, PROCESS_LOG_PREFIX, PROCESS_STATE_PREFIX, REMOTE_COMMUNICATION_PREFIX,
    SUPERVISOR_STATE_CHANGE_PREFIX, TICK_PREFIX,
};
pub use frame::{build_frame, Frame};
pub use header::{keys, Header};
pub use payload::{
    Event, EventPayload, ProcessLogEvent, ProcessStateEvent, RemoteCommunicationEvent,
    SupervisorStateChangeEvent, TickEvent,
};
pub use result::{EventResult, RESULT_KEYWORD};
pub use tokens::TokenMap;

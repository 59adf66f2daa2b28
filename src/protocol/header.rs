//! Event header line encoding and decoding.
//!
//! Every frame starts with one header line of `key:value` tokens:
//! ```text
//! ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:PROCESS_STATE_RUNNING len:54
//! ```
//!
//! | key          | field         | type    |
//! |--------------|---------------|---------|
//! | `ver`        | `version`     | string  |
//! | `server`     | `server`      | string  |
//! | `serial`     | `serial`      | integer |
//! | `pool`       | `pool`        | string  |
//! | `poolserial` | `pool_serial` | integer |
//! | `eventname`  | `event_name`  | string  |
//! | `len`        | `len`         | integer |
//!
//! Token order is irrelevant and unknown keys are ignored.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::category::EventCategory;
use super::tokens::TokenMap;
use crate::error::DecodeError;
use crate::state::ProcessStateCode;

/// Header token keys.
pub mod keys {
    /// Protocol version.
    pub const VERSION: &str = "ver";
    /// Identity of the sending supervisor.
    pub const SERVER: &str = "server";
    /// Process-wide event serial.
    pub const SERIAL: &str = "serial";
    /// Listener pool name.
    pub const POOL: &str = "pool";
    /// Pool-wide event serial.
    pub const POOL_SERIAL: &str = "poolserial";
    /// Event name, routed by prefix.
    pub const EVENT_NAME: &str = "eventname";
    /// Payload length in bytes.
    pub const LEN: &str = "len";
}

/// Decoded event header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Protocol version (`3.0` for current supervisord).
    pub version: String,
    /// Server identity.
    pub server: String,
    /// Monotonic serial, process scope.
    pub serial: u64,
    /// Pool name.
    pub pool: String,
    /// Monotonic serial, pool scope.
    pub pool_serial: u64,
    /// Full event name, e.g. `PROCESS_STATE_STOPPED`.
    pub event_name: String,
    /// Exact number of payload bytes following the header line.
    pub len: usize,
}

impl Header {
    /// Parse a header line (with or without its trailing newline).
    ///
    /// # Example
    ///
    /// ```
    /// use supervisor_listener::protocol::Header;
    ///
    /// let header = Header::parse(
    ///     "ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:TICK_5 len:15",
    /// )
    /// .unwrap();
    /// assert_eq!(header.serial, 21);
    /// assert_eq!(header.event_name, "TICK_5");
    /// assert_eq!(header.len, 15);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when a required key is missing, a token is
    /// malformed, or a numeric field is not an integer.
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        let tokens = TokenMap::parse(line)?;
        Ok(Self {
            version: tokens.require_string(keys::VERSION)?,
            server: tokens.require_string(keys::SERVER)?,
            serial: tokens.require_int(keys::SERIAL)?,
            pool: tokens.require_string(keys::POOL)?,
            pool_serial: tokens.require_int(keys::POOL_SERIAL)?,
            event_name: tokens.require_string(keys::EVENT_NAME)?,
            len: tokens.require_int(keys::LEN)?,
        })
    }

    /// Category selected by the event name prefix, if any.
    #[inline]
    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::from_event_name(&self.event_name)
    }

    /// Event name without its category prefix (`STOPPED` for
    /// `PROCESS_STATE_STOPPED`).
    pub fn event_suffix(&self) -> Option<&str> {
        self.category()?.suffix(&self.event_name)
    }

    /// State a process entered, for `PROCESS_STATE_*` events.
    pub fn target_state(&self) -> Option<ProcessStateCode> {
        match self.category()? {
            EventCategory::ProcessState => self.event_suffix()?.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for Header {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Header line without the trailing newline.
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}:{} {}:{} {}:{} {}:{} {}:{} {}:{}",
            keys::VERSION,
            self.version,
            keys::SERVER,
            self.server,
            keys::SERIAL,
            self.serial,
            keys::POOL,
            self.pool,
            keys::POOL_SERIAL,
            self.pool_serial,
            keys::EVENT_NAME,
            self.event_name,
            keys::LEN,
            self.len
        )
    }
}

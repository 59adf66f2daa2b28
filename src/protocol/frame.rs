//! Frame struct: one header plus its length-declared body.
//!
//! # Example
//!
//! ```
//! use supervisor_listener::protocol::{build_frame, Frame, Header};
//! use bytes::Bytes;
//!
//! let header: Header =
//!     "ver:3.0 server:supervisor serial:1 pool:p poolserial:1 eventname:TICK_5 len:7"
//!         .parse()
//!         .unwrap();
//! let frame = Frame::new(header, Bytes::from_static(b"when:10"));
//!
//! assert!(frame.decode_event().unwrap().is_some());
//! assert!(build_frame(&frame.header, &frame.payload).ends_with(b"\nwhen:10"));
//! ```

use bytes::Bytes;

use super::header::Header;
use super::payload::Event;
use crate::error::DecodeError;

/// A complete inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded header.
    pub header: Header,
    /// Payload bytes, exactly `header.len` long.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from header and payload.
    pub fn new(header: Header, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Event name from the header.
    #[inline]
    pub fn event_name(&self) -> &str {
        &self.header.event_name
    }

    /// Decode the payload by category.
    ///
    /// Returns `Ok(None)` for event names outside the known categories.
    pub fn decode_event(&self) -> Result<Option<Event>, DecodeError> {
        self.header
            .category()
            .map(|category| Event::decode(category, &self.payload))
            .transpose()
    }
}

/// Build the wire bytes of a frame: header line, `\n`, payload.
///
/// The header's `len` is written as given; callers keep it equal to
/// `payload.len()` unless they are producing a broken frame on purpose.
pub fn build_frame(header: &Header, payload: &[u8]) -> Vec<u8> {
    let line = header.to_string();
    let mut buf = Vec::with_capacity(line.len() + 1 + payload.len());
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');
    buf.extend_from_slice(payload);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Event, TickEvent};

    fn header(event_name: &str, len: usize) -> Header {
        Header {
            version: "3.0".to_string(),
            server: "supervisor".to_string(),
            serial: 1,
            pool: "listener".to_string(),
            pool_serial: 1,
            event_name: event_name.to_string(),
            len,
        }
    }

    #[test]
    fn test_decode_known_category() {
        let frame = Frame::new(header("TICK_60", 7), Bytes::from_static(b"when:60"));
        assert_eq!(
            frame.decode_event().unwrap(),
            Some(Event::Tick(TickEvent { when: 60 }))
        );
        assert_eq!(frame.event_name(), "TICK_60");
    }

    #[test]
    fn test_decode_unknown_category() {
        let frame = Frame::new(header("CUSTOM_EVENT", 0), Bytes::new());
        assert_eq!(frame.decode_event().unwrap(), None);
    }

    #[test]
    fn test_build_frame_layout() {
        let h = header("TICK_5", 7);
        let bytes = build_frame(&h, b"when:10");
        let expected = format!("{h}\nwhen:10");
        assert_eq!(bytes, expected.as_bytes());
    }

    #[test]
    fn test_build_frame_empty_payload() {
        let h = header("SUPERVISOR_STATE_CHANGE_RUNNING", 0);
        let bytes = build_frame(&h, &[]);
        assert_eq!(bytes.last(), Some(&b'\n'));
    }
}

//! Acknowledgment frames.
//!
//! Every event is answered with exactly one result frame:
//! ```text
//! RESULT <n>\n<body>
//! ```
//! where `<body>` is `OK` or `FAIL` and `<n>` its byte length. No newline
//! follows the body; the peer reads exactly `<n>` bytes.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use crate::error::DecodeError;

/// Literal first word of an acknowledgment frame.
pub const RESULT_KEYWORD: &str = "RESULT";

/// Outcome of processing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventResult {
    /// Event accepted.
    Ok,
    /// Event rejected; supervisord will re-queue it.
    Fail,
}

impl EventResult {
    /// Body text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
        }
    }

    /// Check if this is `OK`.
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Encode the full acknowledgment frame.
    ///
    /// # Example
    ///
    /// ```
    /// use supervisor_listener::protocol::EventResult;
    ///
    /// assert_eq!(&EventResult::Ok.encode()[..], b"RESULT 2\nOK");
    /// assert_eq!(&EventResult::Fail.encode()[..], b"RESULT 4\nFAIL");
    /// ```
    pub fn encode(self) -> Bytes {
        let body = self.as_str();
        Bytes::from(format!("{RESULT_KEYWORD} {}\n{body}", body.len()))
    }

    /// Decode an acknowledgment frame (the peer's view).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedResult`] when the length line is
    /// missing or malformed, the body length disagrees with the prefix, or
    /// the body is neither `OK` nor `FAIL`.
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let newline = frame
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| DecodeError::MalformedResult("missing length line".to_string()))?;
        let line = std::str::from_utf8(&frame[..newline]).map_err(|_| DecodeError::InvalidUtf8)?;
        let body = &frame[newline + 1..];

        let len = line
            .strip_prefix(RESULT_KEYWORD)
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(|| DecodeError::MalformedResult(format!("bad length line {line:?}")))?;
        let len: usize = len
            .parse()
            .map_err(|_| DecodeError::MalformedResult(format!("bad length {len:?}")))?;

        if body.len() != len {
            return Err(DecodeError::MalformedResult(format!(
                "declared {len} bytes, got {}",
                body.len()
            )));
        }

        match body {
            b"OK" => Ok(Self::Ok),
            b"FAIL" => Ok(Self::Fail),
            other => Err(DecodeError::MalformedResult(format!(
                "unknown body {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

impl From<bool> for EventResult {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Ok
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for EventResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_exact_bytes() {
        assert_eq!(&EventResult::Ok.encode()[..], b"RESULT 2\nOK");
        assert_eq!(&EventResult::Fail.encode()[..], b"RESULT 4\nFAIL");
    }

    #[test]
    fn test_length_prefix_matches_body() {
        for result in [EventResult::Ok, EventResult::Fail] {
            let frame = result.encode();
            let text = std::str::from_utf8(&frame).unwrap();
            let (line, body) = text.split_once('\n').unwrap();
            let len: usize = line.strip_prefix("RESULT ").unwrap().parse().unwrap();

            assert_eq!(len, body.len());
            assert_eq!(body, result.as_str());
            assert_eq!(EventResult::decode(&frame).unwrap(), result);
        }
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        assert!(matches!(
            EventResult::decode(b"RESULT 3\nOK"),
            Err(DecodeError::MalformedResult(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_body() {
        assert!(EventResult::decode(b"RESULT 4\nNOPE").is_err());
        assert!(EventResult::decode(b"RESULT2\nOK").is_err());
        assert!(EventResult::decode(b"OK").is_err());
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(EventResult::from(true), EventResult::Ok);
        assert_eq!(EventResult::from(false), EventResult::Fail);
        assert!(!EventResult::Fail.is_ok());
    }
}

//! Error types for supervisor-listener.
//!
//! Two layers:
//! - [`DecodeError`] - a single header, payload or acknowledgment could not be
//!   decoded. Payload decode errors stay inside the frame and become `FAIL`.
//! - [`ListenerError`] - the listener loop cannot continue. Returned to the
//!   caller of [`Listener::run`](crate::Listener::run).

use thiserror::Error;

/// Failure to decode `key:value` token data or an acknowledgment frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A token without a `:` separator.
    #[error("malformed token: {0:?}")]
    MalformedToken(String),

    /// A required key is absent.
    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    /// A numeric key whose value is not a non-negative decimal integer.
    #[error("invalid integer for key {key}: {value:?}")]
    InvalidInteger {
        /// Key being decoded.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// A boolean key whose value is not one of the accepted spellings.
    #[error("invalid boolean for key {key}: {value:?}")]
    InvalidBool {
        /// Key being decoded.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// Token data is not valid UTF-8.
    #[error("token data is not valid UTF-8")]
    InvalidUtf8,

    /// A process state label not known to supervisord.
    #[error("unknown process state: {0:?}")]
    UnknownProcessState(String),

    /// An acknowledgment frame that is not `RESULT <n>\n<body>`.
    #[error("malformed result frame: {0}")]
    MalformedResult(String),
}

/// Terminal error of the listener loop.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// I/O error on the input or output channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input closed between frames.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Input closed in the middle of a header line.
    #[error("Connection closed before end of header line")]
    TruncatedHeader,

    /// Header line could not be decoded; stream alignment is lost.
    #[error("Invalid header: {0}")]
    InvalidHeader(#[source] DecodeError),

    /// Header declared a body larger than the configured maximum.
    #[error("Payload size {len} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Declared length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Input closed before the declared payload length was read.
    #[error("Truncated payload: expected {expected} bytes, received {received}")]
    TruncatedPayload {
        /// Declared length.
        expected: usize,
        /// Bytes actually read.
        received: usize,
    },

    /// Process was not started by supervisord.
    #[error("Not running under supervisor (SUPERVISOR_ENABLED != 1)")]
    NotSupervised,
}

impl ListenerError {
    /// True when the peer closed the input at a frame boundary.
    pub fn is_clean_shutdown(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }

    /// True for errors caused by broken framing rather than I/O or bootstrap.
    pub fn is_framing_error(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHeader
                | Self::InvalidHeader(_)
                | Self::PayloadTooLarge { .. }
                | Self::TruncatedPayload { .. }
        )
    }
}

/// Result type alias using ListenerError.
pub type Result<T> = std::result::Result<T, ListenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_shutdown_classification() {
        assert!(ListenerError::ConnectionClosed.is_clean_shutdown());
        assert!(!ListenerError::TruncatedHeader.is_clean_shutdown());
        assert!(!ListenerError::NotSupervised.is_framing_error());
    }

    #[test]
    fn test_framing_error_classification() {
        let truncated = ListenerError::TruncatedPayload {
            expected: 54,
            received: 10,
        };
        assert!(truncated.is_framing_error());
        assert!(ListenerError::InvalidHeader(DecodeError::MissingKey("len")).is_framing_error());
        assert!(!ListenerError::ConnectionClosed.is_framing_error());
    }

    #[test]
    fn test_display_messages() {
        let err = ListenerError::TruncatedPayload {
            expected: 54,
            received: 10,
        };
        assert_eq!(
            err.to_string(),
            "Truncated payload: expected 54 bytes, received 10"
        );
        assert_eq!(
            DecodeError::MissingKey("serial").to_string(),
            "missing required key: serial"
        );
    }
}

//! `key:value` token parsing.
//!
//! Header lines and most payload bodies share one format: tokens separated
//! by whitespace, each token split at its first `:`.
//!
//! ```text
//! processname:cat groupname:cat from_state:STOPPED tries:0 expected:1 pid:2456
//! ```
//!
//! Keys are case-sensitive. Unknown keys are kept but ignored by the typed
//! decoders; a repeated key keeps its last value.
//!
//! # Example
//!
//! ```
//! use supervisor_listener::protocol::TokenMap;
//!
//! let tokens = TokenMap::parse("pid:2456 expected:1\n").unwrap();
//! assert_eq!(tokens.require_int::<u32>("pid").unwrap(), 2456);
//! assert!(tokens.require_bool("expected").unwrap());
//! ```

use std::collections::HashMap;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::DecodeError;

/// Parsed token data borrowing from the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap<'a> {
    tokens: HashMap<&'a str, &'a str>,
}

impl<'a> TokenMap<'a> {
    /// Parse whitespace-separated `key:value` tokens.
    ///
    /// Trailing whitespace (including the line terminator) is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedToken`] for a token without `:`.
    pub fn parse(data: &'a str) -> Result<Self, DecodeError> {
        let mut tokens = HashMap::new();
        for token in data.split_ascii_whitespace() {
            let (key, value) = token
                .split_once(':')
                .ok_or_else(|| DecodeError::MalformedToken(token.to_string()))?;
            tokens.insert(key, value);
        }
        Ok(Self { tokens })
    }

    /// Parse token data from raw bytes.
    pub fn parse_bytes(data: &'a [u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
        Self::parse(text)
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.tokens.get(key).copied()
    }

    /// Get a raw value that must be present.
    pub fn require(&self, key: &'static str) -> Result<&'a str, DecodeError> {
        self.get(key).ok_or(DecodeError::MissingKey(key))
    }

    /// Get a required value as an owned string.
    pub fn require_string(&self, key: &'static str) -> Result<String, DecodeError> {
        self.require(key).map(str::to_string)
    }

    /// Get a required decimal integer.
    pub fn require_int<T>(&self, key: &'static str) -> Result<T, DecodeError>
    where
        T: FromStr<Err = ParseIntError>,
    {
        let value = self.require(key)?;
        value.parse().map_err(|_| DecodeError::InvalidInteger {
            key,
            value: value.to_string(),
        })
    }

    /// Get a required boolean.
    ///
    /// Accepts `1`/`0` and `true`/`false` (any ASCII case). Anything else is
    /// rejected rather than guessed.
    pub fn require_bool(&self, key: &'static str) -> Result<bool, DecodeError> {
        let value = self.require(key)?;
        match value {
            "1" => Ok(true),
            "0" => Ok(false),
            v if v.eq_ignore_ascii_case("true") => Ok(true),
            v if v.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(DecodeError::InvalidBool {
                key,
                value: value.to_string(),
            }),
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if no tokens were parsed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

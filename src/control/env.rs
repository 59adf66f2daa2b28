//! Environment supervisord sets for the processes it spawns.
//!
//! # Example
//!
//! ```
//! use supervisor_listener::control::SupervisorEnv;
//!
//! let env = SupervisorEnv::from_vars([
//!     ("SUPERVISOR_ENABLED", "1"),
//!     ("SUPERVISOR_PROCESS_NAME", "listener"),
//!     ("SUPERVISOR_SERVER_URL", "unix:///tmp/supervisor.sock"),
//! ]);
//! assert!(env.is_enabled());
//! assert_eq!(env.process_name.as_deref(), Some("listener"));
//! ```

use crate::error::{ListenerError, Result};

/// Name of this process in the supervisord config.
pub const ENV_PROCESS_NAME: &str = "SUPERVISOR_PROCESS_NAME";
/// Group this process belongs to.
pub const ENV_GROUP_NAME: &str = "SUPERVISOR_GROUP_NAME";
/// Control-plane URL (`unix://...` or `http://...`).
pub const ENV_SERVER_URL: &str = "SUPERVISOR_SERVER_URL";
/// `1` when started by supervisord.
pub const ENV_ENABLED: &str = "SUPERVISOR_ENABLED";

/// Bootstrap settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorEnv {
    pub process_name: Option<String>,
    pub group_name: Option<String>,
    pub server_url: Option<String>,
    /// Raw `SUPERVISOR_ENABLED` value.
    pub enabled: Option<String>,
}

impl SupervisorEnv {
    /// Read the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from arbitrary key/value pairs. Unrelated keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            let slot = match key.as_ref() {
                ENV_PROCESS_NAME => &mut env.process_name,
                ENV_GROUP_NAME => &mut env.group_name,
                ENV_SERVER_URL => &mut env.server_url,
                ENV_ENABLED => &mut env.enabled,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        env
    }

    /// True only for `SUPERVISOR_ENABLED=1`.
    pub fn is_enabled(&self) -> bool {
        self.enabled.as_deref() == Some("1")
    }

    /// Fail unless started by supervisord.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NotSupervised`] when `SUPERVISOR_ENABLED` is
    /// not `1`.
    pub fn require_supervised(self) -> Result<Self> {
        if self.is_enabled() {
            Ok(self)
        } else {
            Err(ListenerError::NotSupervised)
        }
    }
}

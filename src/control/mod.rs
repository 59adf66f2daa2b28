//! Control module - stdio output and supervisord bootstrap.
//!
//! A listener talks to supervisord on its standard streams:
//!
//! 1. Listener writes `READY\n` to stdout
//! 2. Supervisord writes a header line and payload to stdin
//! 3. Listener handles the event
//! 4. Listener writes `RESULT <n>\n<body>` to stdout
//! 5. Repeat from 1
//!
//! The environment supervisord sets for its children is exposed through
//! [`SupervisorEnv`].

mod env;
mod stdio;

pub use env::{SupervisorEnv, ENV_ENABLED, ENV_GROUP_NAME, ENV_PROCESS_NAME, ENV_SERVER_URL};
pub use stdio::{write_ready, write_result, READY_LINE};

//! # supervisor-listener
//!
//! Event listener protocol engine for processes managed by supervisord.
//!
//! An event listener is a child process that receives lifecycle events on
//! stdin and must acknowledge each one on stdout before the next is sent.
//!
//! ## Architecture
//!
//! - **Protocol**: header line codec, typed payloads, result frames
//! - **Handler**: per-category router with typed handlers
//! - **Listener**: the sequential `READY` / read / dispatch / `RESULT` loop
//! - **Control**: stdio writers and the supervisord environment
//!
//! ## Example
//!
//! ```ignore
//! use supervisor_listener::{EventResult, Listener};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = Listener::builder()
//!         .on_process_state(|header, event| async move {
//!             tracing::info!("{} -> {}", event.process_name, header.event_name);
//!             EventResult::Ok
//!         })
//!         .build();
//!
//!     let err = listener.run_stdio().await;
//!     tracing::info!("listener stopped: {}", err);
//! }
//! ```

pub mod control;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod state;

mod listener;

pub use error::{DecodeError, ListenerError};
pub use listener::{Listener, ListenerBuilder, DEFAULT_MAX_PAYLOAD_LEN};
pub use protocol::{Event, EventResult, Header};
pub use state::ProcessStateCode;

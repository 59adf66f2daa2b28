//! Handler module - event routing and dispatch.
//!
//! Provides:
//! - [`EventRouter`] - maps event categories to handlers
//! - [`EventHandler`] - handler trait, one implementation per payload type
//! - [`FnHandler`] - adapter for async closures
//!
//! # Example
//!
//! ```
//! use supervisor_listener::handler::{EventRouter, FnHandler};
//! use supervisor_listener::protocol::{EventCategory, EventResult, Header, TickEvent};
//!
//! let mut router = EventRouter::new();
//! router.set_tick_handler(FnHandler::new(|_header: Header, tick: TickEvent| async move {
//!     EventResult::from(tick.when > 0)
//! }));
//!
//! assert!(router.is_bound(EventCategory::Tick));
//! assert!(!router.is_bound(EventCategory::ProcessState));
//! ```

mod registry;

pub use registry::{BoxFuture, EventHandler, EventRouter, FnHandler};

//! Event router dispatching frames to per-category handlers.
//!
//! The router holds one slot per [`EventCategory`]. A slot is either
//! unbound, which acknowledges events of that category with `OK` without
//! decoding them, or bound to an [`EventHandler`] for the category's payload
//! type.
//!
//! # Example
//!
//! ```ignore
//! use supervisor_listener::handler::{EventRouter, FnHandler};
//! use supervisor_listener::protocol::{EventResult, Header, ProcessStateEvent};
//!
//! let mut router = EventRouter::new();
//! router.set_process_state_handler(FnHandler::new(|_header: Header, event: ProcessStateEvent| async move {
//!     tracing::info!("{} left {}", event.process_name, event.from_state);
//!     EventResult::Ok
//! }));
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use bytes::Bytes;

use crate::protocol::{
    EventCategory, EventPayload, EventResult, Header, ProcessLogEvent, ProcessStateEvent,
    RemoteCommunicationEvent, SupervisorStateChangeEvent, TickEvent,
};

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handler for one payload type.
pub trait EventHandler<E>: Send + Sync + 'static {
    /// Handle a decoded event. The listener waits for the returned future
    /// before acknowledging.
    fn handle(&self, header: Header, event: E) -> BoxFuture<'static, EventResult>;
}

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F, E, Fut>
where
    F: Fn(Header, E) -> Fut + Send + Sync + 'static,
    E: Send + 'static,
    Fut: Future<Output = EventResult> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(E) -> Fut>,
}

impl<F, E, Fut> FnHandler<F, E, Fut>
where
    F: Fn(Header, E) -> Fut + Send + Sync + 'static,
    E: Send + 'static,
    Fut: Future<Output = EventResult> + Send + 'static,
{
    /// Wrap a closure.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, E, Fut> EventHandler<E> for FnHandler<F, E, Fut>
where
    F: Fn(Header, E) -> Fut + Send + Sync + 'static,
    E: Send + 'static,
    Fut: Future<Output = EventResult> + Send + 'static,
{
    fn handle(&self, header: Header, event: E) -> BoxFuture<'static, EventResult> {
        Box::pin((self.handler)(header, event))
    }
}

/// Handler slot for one category.
enum Slot<E> {
    /// Events are acknowledged with `OK` and not decoded.
    Unbound,
    Bound(Box<dyn EventHandler<E>>),
}

impl<E> Slot<E> {
    fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// Routes frames to handlers by event-name prefix.
pub struct EventRouter {
    process_state: Slot<ProcessStateEvent>,
    remote_communication: Slot<RemoteCommunicationEvent>,
    process_log: Slot<ProcessLogEvent>,
    supervisor_state_change: Slot<SupervisorStateChangeEvent>,
    tick: Slot<TickEvent>,
}

impl EventRouter {
    /// Create a router with every slot unbound.
    pub fn new() -> Self {
        Self {
            process_state: Slot::Unbound,
            remote_communication: Slot::Unbound,
            process_log: Slot::Unbound,
            supervisor_state_change: Slot::Unbound,
            tick: Slot::Unbound,
        }
    }

    /// Bind the `PROCESS_STATE*` slot.
    pub fn set_process_state_handler(&mut self, handler: impl EventHandler<ProcessStateEvent>) {
        self.process_state = Slot::Bound(Box::new(handler));
    }

    /// Bind the `REMOTE_COMMUNICATION*` slot.
    pub fn set_remote_communication_handler(
        &mut self,
        handler: impl EventHandler<RemoteCommunicationEvent>,
    ) {
        self.remote_communication = Slot::Bound(Box::new(handler));
    }

    /// Bind the `PROCESS_LOG*` slot.
    pub fn set_process_log_handler(&mut self, handler: impl EventHandler<ProcessLogEvent>) {
        self.process_log = Slot::Bound(Box::new(handler));
    }

    /// Bind the `SUPERVISOR_STATE_CHANGE*` slot.
    pub fn set_supervisor_state_change_handler(
        &mut self,
        handler: impl EventHandler<SupervisorStateChangeEvent>,
    ) {
        self.supervisor_state_change = Slot::Bound(Box::new(handler));
    }

    /// Bind the `TICK*` slot.
    pub fn set_tick_handler(&mut self, handler: impl EventHandler<TickEvent>) {
        self.tick = Slot::Bound(Box::new(handler));
    }

    /// Check whether a category has a handler.
    pub fn is_bound(&self, category: EventCategory) -> bool {
        match category {
            EventCategory::ProcessState => self.process_state.is_bound(),
            EventCategory::RemoteCommunication => self.remote_communication.is_bound(),
            EventCategory::ProcessLog => self.process_log.is_bound(),
            EventCategory::SupervisorStateChange => self.supervisor_state_change.is_bound(),
            EventCategory::Tick => self.tick.is_bound(),
        }
    }

    /// Dispatch one frame and produce its result.
    ///
    /// - unknown category: `OK`
    /// - unbound slot: `OK`, payload not decoded
    /// - payload decode failure: `FAIL`, handler not called
    /// - otherwise: whatever the handler returns
    ///
    /// A `FAIL` for an undecodable payload makes supervisord re-queue the
    /// same event, so a permanently malformed payload is retried forever.
    pub async fn dispatch(&self, header: &Header, payload: &Bytes) -> EventResult {
        let Some(category) = header.category() else {
            tracing::debug!("Ignoring event {} (unknown category)", header.event_name);
            return EventResult::Ok;
        };

        match category {
            EventCategory::ProcessState => invoke(&self.process_state, header, payload).await,
            EventCategory::RemoteCommunication => {
                invoke(&self.remote_communication, header, payload).await
            }
            EventCategory::ProcessLog => invoke(&self.process_log, header, payload).await,
            EventCategory::SupervisorStateChange => {
                invoke(&self.supervisor_state_change, header, payload).await
            }
            EventCategory::Tick => invoke(&self.tick, header, payload).await,
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

async fn invoke<E: EventPayload>(slot: &Slot<E>, header: &Header, payload: &Bytes) -> EventResult {
    let handler = match slot {
        Slot::Unbound => return EventResult::Ok,
        Slot::Bound(handler) => handler,
    };

    match E::decode(payload) {
        Ok(event) => handler.handle(header.clone(), event).await,
        Err(e) => {
            tracing::warn!(
                "Rejecting event {} (serial {}): {}",
                header.event_name,
                header.serial,
                e
            );
            EventResult::Fail
        }
    }
}

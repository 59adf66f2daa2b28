//! Listener builder and read-dispatch-acknowledge loop.
//!
//! The [`ListenerBuilder`] registers handlers and limits. The [`Listener`]
//! drives the protocol:
//! 1. Write `READY\n`
//! 2. Read one header line
//! 3. Read exactly `len` payload bytes
//! 4. Dispatch to the router and write the result frame
//!
//! Frames are processed strictly one at a time. Supervisord does not send a
//! second event before it has read the result of the first.
//!
//! # Example
//!
//! ```ignore
//! use supervisor_listener::{EventResult, Listener};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = Listener::builder()
//!         .on_process_state(|header, event| async move {
//!             eprintln!("{}: {} left {}", header.event_name, event.process_name, event.from_state);
//!             EventResult::Ok
//!         })
//!         .build();
//!
//!     let err = listener.run_stdio().await;
//!     if !err.is_clean_shutdown() {
//!         std::process::exit(1);
//!     }
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, BufReader};

use crate::control::{write_ready, write_result};
use crate::error::{DecodeError, ListenerError, Result};
use crate::handler::{EventHandler, EventRouter, FnHandler};
use crate::protocol::{
    EventResult, Frame, Header, ProcessLogEvent, ProcessStateEvent, RemoteCommunicationEvent,
    SupervisorStateChangeEvent, TickEvent,
};

/// Default maximum payload size (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Builder for configuring and creating a [`Listener`].
pub struct ListenerBuilder {
    router: EventRouter,
    max_payload_len: usize,
}

impl ListenerBuilder {
    /// Create a new listener builder with every category unbound.
    pub fn new() -> Self {
        Self {
            router: EventRouter::new(),
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    /// Handle `PROCESS_STATE*` events with an async closure.
    pub fn on_process_state<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Header, ProcessStateEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EventResult> + Send + 'static,
    {
        self.process_state_handler(FnHandler::new(handler))
    }

    /// Handle `PROCESS_STATE*` events with a handler type.
    pub fn process_state_handler(mut self, handler: impl EventHandler<ProcessStateEvent>) -> Self {
        self.router.set_process_state_handler(handler);
        self
    }

    /// Handle `REMOTE_COMMUNICATION*` events with an async closure.
    pub fn on_remote_communication<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Header, RemoteCommunicationEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EventResult> + Send + 'static,
    {
        self.remote_communication_handler(FnHandler::new(handler))
    }

    /// Handle `REMOTE_COMMUNICATION*` events with a handler type.
    pub fn remote_communication_handler(
        mut self,
        handler: impl EventHandler<RemoteCommunicationEvent>,
    ) -> Self {
        self.router.set_remote_communication_handler(handler);
        self
    }

    /// Handle `PROCESS_LOG*` events with an async closure.
    pub fn on_process_log<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Header, ProcessLogEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EventResult> + Send + 'static,
    {
        self.process_log_handler(FnHandler::new(handler))
    }

    /// Handle `PROCESS_LOG*` events with a handler type.
    pub fn process_log_handler(mut self, handler: impl EventHandler<ProcessLogEvent>) -> Self {
        self.router.set_process_log_handler(handler);
        self
    }

    /// Handle `SUPERVISOR_STATE_CHANGE*` events with an async closure.
    pub fn on_supervisor_state_change<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Header, SupervisorStateChangeEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EventResult> + Send + 'static,
    {
        self.supervisor_state_change_handler(FnHandler::new(handler))
    }

    /// Handle `SUPERVISOR_STATE_CHANGE*` events with a handler type.
    pub fn supervisor_state_change_handler(
        mut self,
        handler: impl EventHandler<SupervisorStateChangeEvent>,
    ) -> Self {
        self.router.set_supervisor_state_change_handler(handler);
        self
    }

    /// Handle `TICK*` events with an async closure.
    pub fn on_tick<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Header, TickEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EventResult> + Send + 'static,
    {
        self.tick_handler(FnHandler::new(handler))
    }

    /// Handle `TICK*` events with a handler type.
    pub fn tick_handler(mut self, handler: impl EventHandler<TickEvent>) -> Self {
        self.router.set_tick_handler(handler);
        self
    }

    /// Set the largest payload the listener will read.
    ///
    /// A header declaring more terminates the loop.
    /// Default: 16 MiB
    pub fn max_payload_len(mut self, limit: usize) -> Self {
        self.max_payload_len = limit;
        self
    }

    /// Build the listener.
    pub fn build(self) -> Listener {
        Listener {
            router: self.router,
            max_payload_len: self.max_payload_len,
        }
    }
}

impl Default for ListenerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Position in the frame cycle.
#[derive(Debug)]
enum State {
    AwaitingHeader,
    AwaitingPayload(Header),
    Dispatching(Frame),
}

/// A configured event listener.
pub struct Listener {
    router: EventRouter,
    max_payload_len: usize,
}

impl Listener {
    /// Create a new listener builder.
    pub fn builder() -> ListenerBuilder {
        ListenerBuilder::new()
    }

    /// The router used for dispatch.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Maximum accepted payload length.
    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Run on the process's stdin and stdout.
    pub async fn run_stdio(&self) -> ListenerError {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.run(reader, writer).await
    }

    /// Run the loop until it terminates and return the terminating error.
    ///
    /// [`ListenerError::ConnectionClosed`] means the peer closed the input
    /// between frames; anything else is a broken stream or an I/O failure.
    /// There is no restart: a new loop would have lost frame alignment.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> ListenerError
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let err = match self.drive(&mut reader, &mut writer).await {
            Ok(never) => match never {},
            Err(e) => e,
        };

        if err.is_clean_shutdown() {
            tracing::info!("Event stream closed, listener exiting");
        } else {
            tracing::error!("Listener terminated: {}", err);
        }
        err
    }

    async fn drive<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<Infallible>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut state = State::AwaitingHeader;

        loop {
            state = match state {
                State::AwaitingHeader => {
                    write_ready(writer).await?;
                    State::AwaitingPayload(read_header(reader).await?)
                }
                State::AwaitingPayload(header) => {
                    let payload = self.read_payload(reader, &header).await?;
                    State::Dispatching(Frame::new(header, payload))
                }
                State::Dispatching(frame) => {
                    let result = self.router.dispatch(&frame.header, &frame.payload).await;
                    tracing::debug!(
                        "Event {} serial {} -> {}",
                        frame.header.event_name,
                        frame.header.serial,
                        result
                    );
                    write_result(writer, result).await?;
                    State::AwaitingHeader
                }
            };
        }
    }

    async fn read_payload<R>(&self, reader: &mut R, header: &Header) -> Result<Bytes>
    where
        R: AsyncBufRead + Unpin,
    {
        if header.len > self.max_payload_len {
            return Err(ListenerError::PayloadTooLarge {
                len: header.len,
                max: self.max_payload_len,
            });
        }
        if header.len == 0 {
            return Ok(Bytes::new());
        }

        let mut buf = Vec::with_capacity(header.len);
        let received = (&mut *reader)
            .take(header.len as u64)
            .read_to_end(&mut buf)
            .await?;

        if received < header.len {
            return Err(ListenerError::TruncatedPayload {
                expected: header.len,
                received,
            });
        }
        Ok(Bytes::from(buf))
    }
}

async fn read_header<R>(reader: &mut R) -> Result<Header>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(ListenerError::ConnectionClosed);
    }
    if line.last() != Some(&b'\n') {
        return Err(ListenerError::TruncatedHeader);
    }

    let text = std::str::from_utf8(&line)
        .map_err(|_| ListenerError::InvalidHeader(DecodeError::InvalidUtf8))?;
    let header = Header::parse(text).map_err(ListenerError::InvalidHeader)?;
    tracing::debug!(
        "Header serial {} pool {}/{} event {} len {}",
        header.serial,
        header.pool,
        header.pool_serial,
        header.event_name,
        header.len
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::protocol::build_frame;

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

    async fn run_on(listener: &Listener, input: Vec<u8>) -> (ListenerError, Vec<u8>) {
        let mut output = Vec::new();
        let err = listener.run(Cursor::new(input), &mut output).await;
        (err, output)
    }

    #[test]
    fn test_builder_defaults() {
        let listener = ListenerBuilder::default().build();
        assert_eq!(listener.max_payload_len(), DEFAULT_MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_builder_registration() {
        let listener = Listener::builder()
            .on_process_state(|_, _| async { EventResult::Ok })
            .on_tick(|_, _| async { EventResult::Ok })
            .max_payload_len(1024)
            .build();

        let router = listener.router();
        assert!(router.is_bound(crate::protocol::EventCategory::ProcessState));
        assert!(router.is_bound(crate::protocol::EventCategory::Tick));
        assert!(!router.is_bound(crate::protocol::EventCategory::ProcessLog));
        assert_eq!(listener.max_payload_len(), 1024);
    }

    #[tokio::test]
    async fn test_empty_input_closes_cleanly() {
        let listener = Listener::builder().build();
        let (err, output) = run_on(&listener, Vec::new()).await;

        assert!(err.is_clean_shutdown());
        assert_eq!(output, b"READY\n");
    }

    #[tokio::test]
    async fn test_single_frame_cycle() {
        let listener = Listener::builder().build();
        let input = build_frame(&header("TICK_5", 7), b"when:10");
        let (err, output) = run_on(&listener, input).await;

        assert!(err.is_clean_shutdown());
        assert_eq!(output, b"READY\nRESULT 2\nOKREADY\n");
    }

    #[tokio::test]
    async fn test_zero_length_payload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let listener = Listener::builder()
            .on_supervisor_state_change(move |_, _| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    EventResult::Ok
                }
            })
            .build();

        let input = build_frame(&header("SUPERVISOR_STATE_CHANGE_RUNNING", 0), &[]);
        let (err, output) = run_on(&listener, input).await;

        assert!(err.is_clean_shutdown());
        assert_eq!(output, b"READY\nRESULT 2\nOKREADY\n");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_truncated_payload_terminates() {
        let listener = Listener::builder().build();
        let mut input = header("PROCESS_STATE_RUNNING", 54).to_string().into_bytes();
        input.push(b'\n');
        input.extend_from_slice(b"0123456789");

        let (err, output) = run_on(&listener, input).await;
        assert!(matches!(
            err,
            ListenerError::TruncatedPayload {
                expected: 54,
                received: 10
            }
        ));
        assert_eq!(output, b"READY\n");
    }

    #[tokio::test]
    async fn test_truncated_header_terminates() {
        let listener = Listener::builder().build();
        let (err, _) = run_on(&listener, b"ver:3.0 server:sup".to_vec()).await;
        assert!(matches!(err, ListenerError::TruncatedHeader));
    }

    #[tokio::test]
    async fn test_invalid_header_terminates() {
        let listener = Listener::builder().build();
        let (err, output) = run_on(&listener, b"ver:3.0 len:abc\nwhen:1".to_vec()).await;

        assert!(matches!(err, ListenerError::InvalidHeader(_)));
        assert!(err.is_framing_error());
        assert_eq!(output, b"READY\n");
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_before_read() {
        let listener = Listener::builder().max_payload_len(8).build();
        let input = build_frame(&header("TICK_5", 9), b"when:1000");
        let (err, _) = run_on(&listener, input).await;

        assert!(matches!(
            err,
            ListenerError::PayloadTooLarge { len: 9, max: 8 }
        ));
    }

    #[tokio::test]
    async fn test_decode_failure_continues_with_next_frame() {
        let listener = Listener::builder()
            .on_tick(|_, tick| async move { EventResult::from(tick.when > 0) })
            .build();

        let mut input = build_frame(&header("TICK_5", 8), b"when:abc");
        input.extend(build_frame(&header("TICK_5", 6), b"when:1"));
        let (err, output) = run_on(&listener, input).await;

        assert!(err.is_clean_shutdown());
        assert_eq!(
            output,
            b"READY\nRESULT 4\nFAILREADY\nRESULT 2\nOKREADY\n"
        );
    }

    #[tokio::test]
    async fn test_ack_written_before_next_header_read() {
        use tokio::io::{duplex, AsyncWriteExt};

        let listener = Listener::builder().build();
        let (client, mut supervisor) = duplex(1024);
        let (read_half, write_half) = tokio::io::split(client);

        let task = tokio::spawn(async move {
            listener.run(BufReader::new(read_half), write_half).await
        });

        let mut buf = vec![0u8; 6];
        supervisor.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"READY\n");

        supervisor
            .write_all(&build_frame(&header("CUSTOM_EVENT", 3), b"a:b"))
            .await
            .unwrap();

        let mut ack = vec![0u8; "RESULT 2\nOKREADY\n".len()];
        supervisor.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, b"RESULT 2\nOKREADY\n");

        drop(supervisor);
        let err = task.await.unwrap();
        assert!(err.is_clean_shutdown());
    }
}

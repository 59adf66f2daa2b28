//! State Logger - example event listener.
//!
//! This example demonstrates:
//! - Checking that the process was started by supervisord
//! - Registering typed handlers with the builder
//! - Logging to stderr while stdout carries the protocol
//!
//! # Running under supervisord
//!
//! ```ini
//! [eventlistener:state_logger]
//! command=/path/to/target/debug/examples/state_logger
//! events=PROCESS_STATE,TICK_60
//! ```
//!
//! Set `RUST_LOG=debug` to see every frame.

use supervisor_listener::control::SupervisorEnv;
use supervisor_listener::{EventResult, Listener};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let env = SupervisorEnv::from_env().require_supervised()?;
    tracing::info!(
        "Listening as {} in group {}",
        env.process_name.as_deref().unwrap_or("?"),
        env.group_name.as_deref().unwrap_or("?")
    );

    let listener = Listener::builder()
        .on_process_state(|header, event| async move {
            let to = header.event_suffix().unwrap_or("?").to_string();
            tracing::info!(
                "{}:{} {} -> {} (pid {}, tries {}, expected {})",
                event.group_name,
                event.process_name,
                event.from_state,
                to,
                event.pid,
                event.tries,
                event.expected
            );
            if let Ok(json) = serde_json::to_string(&event) {
                tracing::debug!("event {}", json);
            }
            EventResult::Ok
        })
        .on_tick(|header, tick| async move {
            tracing::debug!("{} at {}", header.event_name, tick.when);
            EventResult::Ok
        })
        .build();

    let err = listener.run_stdio().await;
    if err.is_clean_shutdown() {
        Ok(())
    } else {
        Err(err.into())
    }
}

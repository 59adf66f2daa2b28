//! Output side of the listener protocol.
//!
//! # Important
//!
//! - **stdout**: protocol bytes only (`READY\n` and result frames)
//! - **stderr**: logs, debug output (supervisord may capture it)
//! - **Never use `println!`**: anything extra on stdout desynchronizes the
//!   peer, and it may emit `\r\n` on Windows
//!
//! Every write is flushed immediately; supervisord blocks until it sees the
//! complete line or frame.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::protocol::EventResult;

/// Readiness marker written before each header read.
pub const READY_LINE: &[u8] = b"READY\n";

/// Signal that the next event may be sent.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub async fn write_ready<W: AsyncWrite + Unpin>(writer: &mut W) -> std::io::Result<()> {
    writer.write_all(READY_LINE).await?;
    writer.flush().await
}

/// Acknowledge the current event with a length-prefixed result frame.
///
/// # Errors
///
/// Returns IO error if write or flush fails.
pub async fn write_result<W: AsyncWrite + Unpin>(
    writer: &mut W,
    result: EventResult,
) -> std::io::Result<()> {
    writer.write_all(&result.encode()).await?;
    writer.flush().await
}

//! Blocking WebSocket client bridge over a dedicated async transport thread.
//!
//! This library lets a single control thread issue blocking `connect`,
//! `send`, and `receive-with-timeout` calls against a WebSocket peer while
//! the actual I/O (handshake, framing, byte shuffling) runs on a separate
//! event-driven thread.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐                          ┌────────────────────┐
//! │   Caller thread   │  commands + completions  │  Transport thread  │
//! │                   │─────────────────────────►│                    │
//! │  SyncWebSocket    │                          │  tokio event loop  │
//! │  connect/send/    │◄─────────────────────────│  tokio-tungstenite │
//! │  receive          │  inbound queue + condvar │  socket            │
//! └───────────────────┘                          └────────────────────┘
//! ```
//!
//! Key design principles:
//!
//! - One mutex guards the inbound queue, the connection tri-state, and the
//!   session generation; a condition variable on the same mutex wakes
//!   blocked receivers on message arrival and disconnect
//! - `connect` and `send` are synchronous RPCs: the caller parks on a
//!   per-call completion until the transport thread resolves it
//! - Reconnection is explicit and caller-initiated; a successful reconnect
//!   starts a fresh session and discards the superseded session's backlog
//! - Failures resolve locally into `bool` / [`ReceiveResult`]; nothing
//!   crosses the thread boundary as an unhandled fault
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use sync_websocket::{ReceiveResult, SyncWebSocket};
//!
//! fn main() -> sync_websocket::Result<()> {
//!     let socket = SyncWebSocket::new()?;
//!
//!     if !socket.connect("ws://127.0.0.1:9222/session") {
//!         eprintln!("peer unreachable");
//!         return Ok(());
//!     }
//!
//!     socket.send("ping");
//!     match socket.receive_next_message(Duration::from_secs(10)) {
//!         ReceiveResult::Message(text) => println!("got: {text}"),
//!         ReceiveResult::Timeout => println!("no reply within budget"),
//!         ReceiveResult::Disconnected => println!("peer closed the session"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`socket`] | [`SyncWebSocket`] facade and connection state |
//! | `transport` | Transport thread and event loop (internal) |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`timeout`] | [`Deadline`] wait budget helper |
//!
//! # What this crate is not
//!
//! No multiplexing of logical streams, no message prioritization, no
//! backpressure beyond the transport's own, no authentication, and no
//! parsing of message contents: payloads are opaque to the bridge and
//! routing (recipient, method, id) is the caller's business.

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Blocking facade and shared connection state.
pub mod socket;

/// Wait budget tracking for blocking calls.
pub mod timeout;

/// WebSocket transport layer.
///
/// Internal module owning the transport thread.
pub(crate) mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Socket types
pub use socket::{ConnectionState, ReceiveResult, SyncWebSocket};

// Error types
pub use error::{Error, Result};

// Timing
pub use timeout::Deadline;

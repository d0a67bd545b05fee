//! Blocking facade over the transport driver.
//!
//! [`SyncWebSocket`] is the public surface of the crate: five synchronous
//! operations executed on the caller's thread, bridged to the transport
//! thread's event loop. See the crate docs for the threading model.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::socket::state::{ConnectionState, ReceiveResult, Shared};
use crate::transport::TransportDriver;

// ============================================================================
// SyncWebSocket
// ============================================================================

/// A blocking WebSocket client backed by a dedicated transport thread.
///
/// One instance owns one transport thread, one inbound queue, and at most
/// one live session at a time. Reconnecting is explicit: every recovery from
/// a lost session goes through [`connect`](Self::connect).
///
/// # Threading
///
/// The bridge is built for a single control thread issuing one call at a
/// time. [`connect`](Self::connect) and [`send`](Self::send) block until the
/// transport resolves them; [`receive_next_message`](Self::receive_next_message)
/// blocks up to the caller's budget; [`has_next_message`](Self::has_next_message)
/// and [`is_connected`](Self::is_connected) never block.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sync_websocket::{ReceiveResult, SyncWebSocket};
///
/// # fn main() -> sync_websocket::Result<()> {
/// let socket = SyncWebSocket::new()?;
///
/// if socket.connect("ws://127.0.0.1:9222/session") {
///     socket.send("{\"id\":1,\"method\":\"status\"}");
///     match socket.receive_next_message(Duration::from_secs(10)) {
///         ReceiveResult::Message(reply) => println!("{reply}"),
///         ReceiveResult::Timeout => println!("no reply in time"),
///         ReceiveResult::Disconnected => println!("peer went away"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct SyncWebSocket {
    /// State shared with the transport thread.
    shared: Arc<Shared>,
    /// Handle to the transport thread.
    driver: TransportDriver,
}

impl SyncWebSocket {
    /// Creates a disconnected bridge and spawns its transport thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the transport thread cannot be spawned.
    pub fn new() -> Result<Self> {
        let shared = Arc::new(Shared::new());
        let driver = TransportDriver::spawn(Arc::clone(&shared))?;
        Ok(Self { shared, driver })
    }

    /// Connects to `url`, blocking until the handshake resolves.
    ///
    /// Any live session is closed first. On success the session generation
    /// is bumped and the inbound queue is cleared, discarding backlog from
    /// the superseded session. On failure (unreachable host, rejected
    /// handshake, invalid endpoint) the bridge stays disconnected and the
    /// queue keeps whatever it held; a reachable-again peer makes the call
    /// worth retrying.
    pub fn connect(&self, url: &str) -> bool {
        let result = parse_endpoint(url).and_then(|parsed| self.driver.connect(parsed));

        match result {
            Ok(()) => true,
            Err(e) if e.is_recoverable() => {
                warn!(url, error = %e, "Connect failed");
                false
            }
            Err(e) => {
                warn!(url, error = %e, "Connect rejected");
                false
            }
        }
    }

    /// Sends one complete text message, blocking until the write resolves.
    ///
    /// Returns `false` immediately when disconnected, without touching the
    /// transport. A write failure transitions the bridge to disconnected as
    /// a side effect. No partial sends are observable.
    pub fn send(&self, message: impl Into<String>) -> bool {
        if !self.shared.is_connected() {
            debug!("Send while disconnected");
            return false;
        }

        match self.driver.send(message.into()) {
            Ok(()) => true,
            Err(e) => {
                if e.is_connection_error() {
                    warn!(error = %e, "Send failed, session lost");
                } else {
                    warn!(error = %e, "Send failed");
                }
                false
            }
        }
    }

    /// Receives the next message, waiting at most `timeout`.
    ///
    /// Queued backlog is served first, even after a disconnect; only with an
    /// empty queue does connectivity decide between waiting and returning
    /// [`ReceiveResult::Disconnected`]. A zero timeout checks and returns
    /// without yielding beyond a scheduling quantum. Messages come back in
    /// strict arrival order, one per call.
    #[must_use]
    pub fn receive_next_message(&self, timeout: Duration) -> ReceiveResult {
        self.shared.receive(timeout)
    }

    /// Returns `true` iff a message is already buffered. Never blocks.
    #[must_use]
    pub fn has_next_message(&self) -> bool {
        self.shared.has_next_message()
    }

    /// Returns `true` iff the current session is connected. Never blocks.
    ///
    /// May race with an in-flight disconnect; a `true` here does not
    /// guarantee the next [`send`](Self::send) succeeds.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Returns the current [`ConnectionState`]. Never blocks.
    ///
    /// Same caveat as [`is_connected`](Self::is_connected): the transport
    /// thread may move on right after the read.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Returns the session generation: 0 before the first successful
    /// connect, incremented on each one after.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation()
    }
}

impl Drop for SyncWebSocket {
    fn drop(&mut self) {
        // Closes the socket, wakes blocked receivers with Disconnected, and
        // joins the transport thread.
        self.driver.shutdown();
    }
}

// ============================================================================
// Endpoint validation
// ============================================================================

/// Validates a caller-supplied endpoint.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] on parse failure or a scheme other
/// than `ws`/`wss`.
fn parse_endpoint(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| Error::invalid_endpoint(url))?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
        return Err(Error::invalid_endpoint(url));
    }
    Ok(parsed)
}

// ============================================================================
// Tests
// ============================================================================

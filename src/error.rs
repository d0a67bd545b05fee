//! Error types for the synchronous WebSocket bridge.
//!
//! The public bridge operations resolve every failure into a `bool` or a
//! [`ReceiveResult`](crate::socket::ReceiveResult): nothing escapes the
//! thread boundary as an unhandled fault. [`Error`] is the taxonomy the
//! endpoint validation, the transport driver, and the fallible constructor
//! produce; the facade logs each error and collapses it at the API edge.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Endpoint | [`Error::InvalidEndpoint`] |
//! | Connection | [`Error::ConnectionClosed`], [`Error::WebSocket`] |
//! | External | [`Error::Io`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Endpoint Errors
    // ========================================================================
    /// Endpoint URL could not be parsed or has an unsupported scheme.
    ///
    /// Produced by `connect`'s validation; only `ws` and `wss` endpoints
    /// are accepted.
    #[error("Invalid endpoint: {url}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        url: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// No live session, or the transport thread is gone.
    ///
    /// Produced when a write is attempted without a connected session and
    /// when the command channel to the transport thread has closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// WebSocket handshake or frame-level failure.
    ///
    /// Produced when dialing fails (unreachable host, rejected upgrade) and
    /// when a write errors mid-session.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    ///
    /// Produced when the transport thread cannot be spawned.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Transport thread went away before answering an in-flight call.
    #[error("Transport channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid endpoint error.
    #[inline]
    pub fn invalid_endpoint(url: impl Into<String>) -> Self {
        Self::InvalidEndpoint { url: url.into() }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::WebSocket(_))
    }

    /// Returns `true` if this error is recoverable by a new `connect` call.
    ///
    /// Everything except an invalid endpoint can succeed on retry once the
    /// peer is reachable again.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidEndpoint { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

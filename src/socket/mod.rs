//! Blocking facade and shared connection state.
//!
//! This module holds the public surface of the bridge and the state both
//! threads share.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`SyncWebSocket`] blocking facade |
//! | `state` | Connection tri-state, session generation, inbound queue |

// ============================================================================
// Submodules
// ============================================================================

/// Blocking facade over the transport driver.
pub mod core;

/// Shared connection state and the inbound message queue.
pub(crate) mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::SyncWebSocket;
pub use state::{ConnectionState, ReceiveResult};

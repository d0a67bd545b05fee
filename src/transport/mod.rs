//! WebSocket transport layer.
//!
//! Internal module owning the dedicated transport thread. The blocking
//! facade posts commands here and parks on their completions; decoded
//! inbound frames flow the other way into the shared queue.
//!
//! ```text
//! ┌──────────────────┐   commands + completions   ┌──────────────────┐
//! │  Caller thread   │───────────────────────────►│ Transport thread │
//! │  (SyncWebSocket) │                            │ (tokio event     │
//! │                  │◄───────────────────────────│  loop + socket)  │
//! └──────────────────┘   inbound queue + condvar  └──────────────────┘
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Transport driver thread and event loop.
pub(crate) mod driver;

// ============================================================================
// Re-exports
// ============================================================================

pub(crate) use driver::TransportDriver;

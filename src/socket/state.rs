//! Shared connection state and the inbound message queue.
//!
//! Everything both threads touch lives here: the connection tri-state, the
//! session generation counter, and the inbound FIFO. One mutex guards all of
//! it; a condition variable on the same mutex wakes blocked receivers on
//! "message enqueued" and "disconnected" events.
//!
//! The transport thread is the sole producer (messages, connectivity
//! transitions); the caller thread only drains and observes. Keeping the
//! whole receive decision policy on [`Shared`] makes it testable without
//! opening a socket.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::timeout::Deadline;

// ============================================================================
// ConnectionState
// ============================================================================

/// Connectivity of the current session.
///
/// Transitions happen only on the transport thread; `Disconnected` is entered
/// at most once per lost session and is terminal until the next successful
/// connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live connection. Initial state.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Handshake completed; reads and writes are possible.
    Connected,
}

// ============================================================================
// ReceiveResult
// ============================================================================

/// Outcome of a blocking receive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveResult {
    /// The oldest queued message, in strict arrival order.
    Message(String),
    /// The wait budget elapsed with no message and the connection still up.
    Timeout,
    /// The queue is empty and the session is gone. Recover via `connect`.
    Disconnected,
}

impl ReceiveResult {
    /// Returns the payload if this is a message, consuming the result.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        match self {
            Self::Message(text) => Some(text),
            _ => None,
        }
    }
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between the caller thread and the transport thread.
pub(crate) struct Shared {
    /// Guards queue, connection state, and generation together.
    inner: Mutex<Inner>,
    /// Signaled on message arrival (one waiter) and disconnect (all waiters).
    messages: Condvar,
}

/// Mutex-protected interior of [`Shared`].
struct Inner {
    /// Inbound FIFO. Arrival order from the peer, never reordered.
    queue: VecDeque<String>,
    /// Connectivity of the current session.
    state: ConnectionState,
    /// Incremented on every successful connect. Starts at 0.
    generation: u64,
}

impl Shared {
    /// Creates the initial disconnected state with an empty queue.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                state: ConnectionState::Disconnected,
                generation: 0,
            }),
            messages: Condvar::new(),
        }
    }

    // ========================================================================
    // Transport thread side
    // ========================================================================

    /// Appends a decoded message and wakes one blocked receiver.
    pub(crate) fn push_message(&self, text: String) {
        let mut inner = self.inner.lock();
        inner.queue.push_back(text);
        self.messages.notify_one();
    }

    /// Marks the handshake as in flight.
    pub(crate) fn set_connecting(&self) {
        self.inner.lock().state = ConnectionState::Connecting;
    }

    /// Installs a fresh session: connected, generation bumped, queue cleared.
    ///
    /// Discarding the backlog here (and only here) is what keeps invariant
    /// "queue contains only current-session messages" while still letting a
    /// failed connect leave stale backlog readable.
    pub(crate) fn begin_session(&self) {
        let mut inner = self.inner.lock();
        inner.queue.clear();
        inner.state = ConnectionState::Connected;
        inner.generation += 1;
    }

    /// Records the loss of the current session and wakes all waiters.
    ///
    /// Idempotent: repeated calls after the first are no-ops, so teardown
    /// paths may call it unconditionally. The queue is left untouched.
    pub(crate) fn mark_disconnected(&self) {
        let mut inner = self.inner.lock();
        if inner.state != ConnectionState::Disconnected {
            inner.state = ConnectionState::Disconnected;
            self.messages.notify_all();
        }
    }

    // ========================================================================
    // Caller thread side
    // ========================================================================

    /// Blocking receive with a bounded wait budget.
    ///
    /// Decision policy, re-evaluated under the lock after every wakeup:
    ///
    /// 1. Queue non-empty → pop the oldest message, regardless of
    ///    connectivity (a dead session may still have unread backlog).
    /// 2. Disconnected → [`ReceiveResult::Disconnected`], no wait.
    /// 3. Otherwise wait for a message, a disconnect, or budget exhaustion.
    pub(crate) fn receive(&self, budget: Duration) -> ReceiveResult {
        let deadline = Deadline::after(budget);
        let mut inner = self.inner.lock();

        loop {
            if let Some(text) = inner.queue.pop_front() {
                return ReceiveResult::Message(text);
            }

            if inner.state == ConnectionState::Disconnected {
                return ReceiveResult::Disconnected;
            }

            let remaining = deadline.remaining();
            if remaining == Duration::ZERO {
                return ReceiveResult::Timeout;
            }

            // Releases the lock while parked; spurious wakeups are handled
            // by re-running the policy against the same deadline.
            self.messages.wait_for(&mut inner, remaining);
        }
    }

    /// Returns `true` iff a message is queued. Does not consume.
    pub(crate) fn has_next_message(&self) -> bool {
        !self.inner.lock().queue.is_empty()
    }

    /// Returns `true` iff the current session is connected.
    pub(crate) fn is_connected(&self) -> bool {
        self.inner.lock().state == ConnectionState::Connected
    }

    /// Returns the current connection state.
    pub(crate) fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Returns the current session generation.
    pub(crate) fn generation(&self) -> u64 {
        self.inner.lock().generation
    }
}

// ============================================================================
// Tests
// ============================================================================

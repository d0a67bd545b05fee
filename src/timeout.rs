//! Wait budget tracking for blocking calls.
//!
//! [`Deadline`] fixes a wait budget at construction and answers how much of
//! it remains. The blocking receive loop re-checks it after every condition
//! variable wakeup, so spurious wakeups and partial waits never extend the
//! caller's total wait beyond the original budget.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

// ============================================================================
// Deadline
// ============================================================================

/// A point in time by which a blocking operation must resolve.
///
/// A zero budget is legal and means "check once, never wait".
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// Absolute expiry instant.
    at: Instant,
}

impl Deadline {
    /// Creates a deadline `budget` from now.
    #[inline]
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Returns the remaining budget, saturating at zero once expired.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the budget is exhausted.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining() == Duration::ZERO
    }
}

// ============================================================================
// Tests
// ============================================================================

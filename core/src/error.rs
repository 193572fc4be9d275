//! Error taxonomy for queue-engine operations.
//!
//! Four classes, matching how callers must react:
//!
//! - [`QueueError::Validation`] - malformed or out-of-policy input;
//!   surface immediately, never retry.
//! - [`QueueError::Conflict`] - an attempt to violate a lifecycle
//!   invariant; the caller re-fetches state and retries the *higher-level*
//!   action, not the call.
//! - [`QueueError::Capacity`] - the office's daily limit is reached;
//!   surfaced to citizens as booking-unavailable.
//! - [`QueueError::Store`] - transient storage failure; safe to retry
//!   only for reads. The engine never retries internally, so a mutation
//!   is never silently applied twice.

use crate::notifier::NotifierError;
use crate::store::TokenStoreError;
use thiserror::Error;

/// Errors surfaced by queue-engine operations.
#[derive(Error, Debug)]
pub enum QueueError {
    /// Malformed or out-of-policy input (past date, unknown office or
    /// service, owner mismatch).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invariant-violating operation (finalizing a terminal token,
    /// cancelling a serving token, double-serving).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Booking beyond the office's configured daily limit.
    #[error("Office {office_id} has reached its daily capacity of {limit}")]
    Capacity {
        /// The office that is full.
        office_id: String,
        /// The configured daily limit.
        limit: u32,
    },

    /// Underlying store I/O failure. Bounded retry is the caller's or the
    /// infrastructure's job - not the engine's.
    #[error("Store error: {0}")]
    Store(#[from] TokenStoreError),

    /// Change-signal transport failure. Same transient class as store
    /// failures; only subscription setup surfaces it (publishes are
    /// advisory and never fail an operation).
    #[error("Notifier error: {0}")]
    Notify(#[from] NotifierError),
}

impl QueueError {
    /// Build a validation error from any displayable reason.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Build a conflict error from any displayable reason.
    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    /// Whether a caller may safely re-issue the failed call verbatim.
    ///
    /// Only transient store failures on read paths qualify; mutating
    /// operations detect conflicts instead of being retried blindly.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Store(TokenStoreError::Database(_)))
    }
}

//! Token status lifecycle.
//!
//! Status is a closed sum type with an explicit transition table, so an
//! illegal transition is rejected before it ever reaches storage. The
//! table is the single definition of the lifecycle:
//!
//! ```text
//! pending ──► waiting ──► serving ──► completed
//!    │           │           │
//!    │           │           └──────► skipped
//!    │           ├──────────────────► skipped
//!    ├──────────────────────────────► skipped
//!    │           └──────────────────► cancelled
//!    └──────────────────────────────► cancelled
//! ```
//!
//! `completed`, `skipped`, and `cancelled` are terminal: once reached, a
//! token never transitions again. A `pending` token may be promoted
//! straight to `serving` because the queue projection treats pending
//! tokens for today as waiting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an unknown status string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown token status: {0}")]
pub struct ParseStatusError(String);

/// Lifecycle status of a token.
///
/// Serialized as lower-case strings (`"pending"`, `"waiting"`, ...) both in
/// storage and over the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// Booked but not yet admitted into the live queue.
    Pending,
    /// Admitted, awaiting service.
    Waiting,
    /// Currently being handled - at most one per office at any instant.
    Serving,
    /// Terminal: successfully served.
    Completed,
    /// Terminal: passed over without service.
    Skipped,
    /// Terminal: withdrawn by the citizen before being served.
    Cancelled,
}

impl TokenStatus {
    /// All statuses considered part of the active queue (fetched by the
    /// queue projection).
    pub const ACTIVE: [Self; 3] = [Self::Pending, Self::Waiting, Self::Serving];

    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Cancelled)
    }

    /// Whether this token occupies the active queue (pending, waiting,
    /// or serving).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Waiting | Self::Serving)
    }

    /// Whether this token is eligible for promotion to `serving`.
    ///
    /// Pending tokens count: the projection treats a pending token for
    /// today as waiting.
    #[must_use]
    pub const fn is_queue_eligible(self) -> bool {
        matches!(self, Self::Pending | Self::Waiting)
    }

    /// The transition table.
    ///
    /// Returns `true` iff moving from `self` to `next` is a legal
    /// lifecycle step. Terminal statuses allow nothing.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Waiting | Self::Serving | Self::Skipped | Self::Cancelled
            ),
            Self::Waiting => matches!(
                next,
                Self::Serving | Self::Completed | Self::Skipped | Self::Cancelled
            ),
            Self::Serving => matches!(next, Self::Completed | Self::Skipped),
            Self::Completed | Self::Skipped | Self::Cancelled => false,
        }
    }

    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Serving => "serving",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "waiting" => Ok(Self::Waiting),
            "serving" => Ok(Self::Serving),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Terminal outcome an official may record for a token.
///
/// This is the only vocabulary `set_status` accepts - completing or
/// skipping. Cancellation is a citizen action with its own operation, and
/// `serving` is reachable only through the queue advancer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenOutcome {
    /// Mark the token successfully served.
    Completed,
    /// Mark the token passed over (no-show or deferred).
    Skipped,
}

impl TokenOutcome {
    /// The status this outcome resolves to.
    #[must_use]
    pub const fn status(self) -> TokenStatus {
        match self {
            Self::Completed => TokenStatus::Completed,
            Self::Skipped => TokenStatus::Skipped,
        }
    }
}

impl fmt::Display for TokenOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().as_str())
    }
}

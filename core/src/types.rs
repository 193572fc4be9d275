//! Domain types for the queue engine.
//!
//! Identifiers are newtypes: UUID-backed for entities this system mints
//! (tokens) or receives from the identity collaborator (citizens,
//! officials), validated strings for catalog-owned identifiers (offices,
//! services). The [`Token`] entity is the central record; everything else
//! here is a value object around it.

use crate::status::TokenStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(Uuid);

impl TokenId {
    /// Creates a new random `TokenId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TokenId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a citizen (supplied by the identity collaborator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(Uuid);

impl CitizenId {
    /// Creates a new random `CitizenId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CitizenId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CitizenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an official (supplied by the identity collaborator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficialId(Uuid);

impl OfficialId {
    /// Creates a new random `OfficialId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `OfficialId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OfficialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfficialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated official and their office assignment, as supplied by
/// the external identity collaborator.
///
/// The engine never looks assignments up itself - it only checks that
/// the acting official's office matches the token's.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Official {
    /// The official's identity.
    pub id: OfficialId,
    /// The office this official is assigned to.
    pub office_id: OfficeId,
}

/// Error type for catalog identifier parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid identifier: {0}")]
pub struct ParseIdError(String);

/// Identifier of an office, owned by the external catalog.
///
/// Slug-like (e.g. `"rto-pune"`). Validation only rejects the empty
/// string - the catalog is the authority on which offices exist.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficeId(String);

impl OfficeId {
    /// Create a new `OfficeId` from trusted (catalog-supplied) input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfficeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OfficeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError("office id cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Identifier of a service offered at an office, owned by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a new `ServiceId` from trusted (catalog-supplied) input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError("service id cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

// ============================================================================
// Token number
// ============================================================================

/// Human-readable token number, unique within an office and calendar day.
///
/// Derived from a store-issued per-(office, day) sequence:
/// `RTO-PUNE-20250114-007`. Immutable after creation; uniqueness is
/// enforced by the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenNumber(String);

impl TokenNumber {
    /// Compose a token number from office, day, and daily sequence.
    #[must_use]
    pub fn compose(office_id: &OfficeId, date: NaiveDate, sequence: u32) -> Self {
        Self(format!(
            "{}-{}-{sequence:03}",
            office_id.as_str().to_uppercase(),
            date.format("%Y%m%d")
        ))
    }

    /// Wrap an already-issued token number (e.g. read back from storage).
    #[must_use]
    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the display string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Token
// ============================================================================

/// A citizen's reservation for a service visit - the central entity.
///
/// `position_in_queue` and `estimated_wait_minutes` are display caches:
/// the authoritative values are recomputed by the queue projection on
/// every read and both are `None` once the token leaves the queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque unique id, generated at creation.
    pub id: TokenId,
    /// Display number, unique within (office, appointment day).
    pub token_number: TokenNumber,
    /// The citizen who booked this token; only they may cancel it.
    pub owner_id: CitizenId,
    /// Office the token queues at.
    pub office_id: OfficeId,
    /// Office display name, denormalized from the catalog at booking.
    pub office_name: String,
    /// Requested service.
    pub service_id: ServiceId,
    /// Service display name, denormalized from the catalog at booking.
    pub service_name: String,
    /// Calendar day the token queues on.
    pub appointment_date: NaiveDate,
    /// Display slot label (e.g. `"09:00"`); not schedule-enforced.
    pub appointment_time: String,
    /// Lifecycle status.
    pub status: TokenStatus,
    /// 1-based rank among waiting tokens; `None` outside the queue.
    pub position_in_queue: Option<u32>,
    /// Advisory wait estimate; `None` outside the queue.
    pub estimated_wait_minutes: Option<u32>,
    /// Authoritative FIFO ordering key.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set iff the token reached `completed` or `skipped`.
    pub served_at: Option<DateTime<Utc>>,
    /// Official who finalized the token, iff `completed` or `skipped`.
    pub served_by: Option<OfficialId>,
}

impl Token {
    /// Whether the token has reached a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the token occupies the active queue.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// ============================================================================
// Derived views
// ============================================================================

/// The queue projection for one office and day.
///
/// Never persisted - a pure function of store contents. Waiting tokens
/// are FIFO-ordered with fresh positions and wait estimates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueueView {
    /// The single token currently at the counter, if any.
    pub serving: Option<Token>,
    /// Waiting tokens in service order, positions filled in.
    pub waiting: Vec<Token>,
}

impl QueueView {
    /// Number of tokens ahead of a newly admitted booking.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.waiting.len()
    }
}

/// Day-level counters for an office's dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// All tokens booked for the day, regardless of status.
    pub total: u64,
    /// Pending + waiting tokens.
    pub waiting: u64,
    /// Serving tokens (0 or 1).
    pub serving: u64,
    /// Completed tokens.
    pub served: u64,
}

/// Input to the admission controller.
///
/// Display names are deliberately absent: they are looked up from the
/// catalog at booking time, never trusted from the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Office to queue at.
    pub office_id: OfficeId,
    /// Requested service.
    pub service_id: ServiceId,
    /// Appointment day.
    pub appointment_date: NaiveDate,
    /// Display slot label.
    pub appointment_time: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_number_composition() {
        let office = OfficeId::new("rto-pune");
        let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        let number = TokenNumber::compose(&office, date, 7);
        assert_eq!(number.as_str(), "RTO-PUNE-20250114-007");
    }

    #[test]
    fn office_id_rejects_empty() {
        assert!("".parse::<OfficeId>().is_err());
        assert!("rto-pune".parse::<OfficeId>().is_ok());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = TokenId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
        assert!(json.starts_with('"'));
    }
}

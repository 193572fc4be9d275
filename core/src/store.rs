//! Token store trait and related types.
//!
//! The token store is the durable record of every booking and the single
//! source of truth for queue state. The trait is deliberately minimal:
//! plain reads, a durable insert, and exactly two mutation primitives -
//! a per-row conditional transition and an office-serialized advance.
//!
//! # Concurrency contract
//!
//! Operations are invoked by independent concurrent request handlers.
//! The store - not the caller - provides the synchronization:
//!
//! - [`TokenStore::transition`] is an atomic compare-and-swap on one
//!   token's status. Two racing transitions on the same token resolve to
//!   one winner and one [`TokenStoreError::InvalidState`].
//! - [`TokenStore::advance`] executes with effective mutual exclusion
//!   per office (a per-office lock, or a serializable transaction scoped
//!   to that office's active tokens). Two simultaneous advances for the
//!   same office must never both promote a token to serving.
//!
//! Application-layer read-then-write is how double-serving races happen;
//! neither primitive can be emulated with the plain reads on this trait.
//!
//! # Implementations
//!
//! - `PostgresTokenStore` (in `janseva-postgres`): production, transaction
//!   with row locks over the office's active tokens
//! - `InMemoryTokenStore` (in `janseva-testing`): fast, deterministic,
//!   per-office mutex

use crate::status::TokenStatus;
use crate::types::{CitizenId, OfficeId, OfficialId, Token, TokenId, TokenNumber};
use chrono::{DateTime, NaiveDate, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during token store operations.
#[derive(Error, Debug)]
pub enum TokenStoreError {
    /// No token with the given id exists.
    #[error("Token not found: {0}")]
    NotFound(TokenId),

    /// A conditional transition found the token in a status outside the
    /// expected set. Carries the status actually observed so callers can
    /// produce a precise conflict message.
    #[error("Token is {current}, not in an eligible status for this transition")]
    InvalidState {
        /// The status the token actually had.
        current: TokenStatus,
    },

    /// Insert collided with an existing token number for the same office
    /// and day.
    #[error("Token number already issued: {0}")]
    DuplicateTokenNumber(TokenNumber),

    /// Underlying database or I/O failure (transient).
    #[error("Database error: {0}")]
    Database(String),

    /// Failed to encode or decode a stored token.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A requested status change, applied atomically by the store.
///
/// The store stamps `updated_at` from `at`, and fills `served_at` /
/// `served_by` exactly when the target status is `completed` or
/// `skipped` - the only statuses those fields are defined for.
#[derive(Clone, Debug)]
pub struct StatusChange {
    /// Target status.
    pub to: TokenStatus,
    /// Timestamp of the mutation.
    pub at: DateTime<Utc>,
    /// Acting official, for terminal outcomes.
    pub by: Option<OfficialId>,
}

impl StatusChange {
    /// Apply this change to a token, enforcing the field invariants that
    /// ride along with a status move. Shared by every store
    /// implementation so the rules live in one place.
    pub fn apply(&self, token: &mut Token) {
        token.status = self.to;
        token.updated_at = self.at;
        if matches!(self.to, TokenStatus::Completed | TokenStatus::Skipped) {
            token.served_at = Some(self.at);
            token.served_by = self.by;
        }
        if !self.to.is_queue_eligible() {
            token.position_in_queue = None;
            token.estimated_wait_minutes = None;
        }
    }
}

/// Outcome of an office-serialized queue advance.
#[derive(Clone, Debug, Default)]
pub struct Advance {
    /// The previously serving token, now completed (if one was serving).
    pub completed: Option<Token>,
    /// The token promoted to serving (if the queue was non-empty).
    pub serving: Option<Token>,
}

impl Advance {
    /// Whether the advance mutated anything at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.completed.is_none() && self.serving.is_none()
    }
}

/// Durable, concurrency-safe storage for tokens.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared across request
/// handlers behind `Arc<dyn TokenStore>`.
///
/// # Dyn Compatibility
///
/// Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn`
/// to keep the trait object-safe - the engine holds the store as
/// `Arc<dyn TokenStore>`.
pub trait TokenStore: Send + Sync {
    /// Persist a newly admitted token.
    ///
    /// # Errors
    ///
    /// - `DuplicateTokenNumber`: the (office, token number) pair exists
    /// - `Database`: connection or query failure
    fn insert(
        &self,
        token: Token,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>>;

    /// Fetch a token by id. Returns `None` for unknown ids - absence is
    /// an answer, not an error.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn get(
        &self,
        token_id: TokenId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Token>, TokenStoreError>> + Send + '_>>;

    /// All active (pending, waiting, serving) tokens for an office and
    /// day, in no guaranteed order - ordering is the projection's job.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn active_for_office(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>>;

    /// Every token owned by a citizen, any status, any office.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn for_owner(
        &self,
        owner_id: CitizenId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>>;

    /// Every token booked at an office for a day, any status. Feeds the
    /// capacity check and the day's dashboard counters.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn for_office_date(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>>;

    /// Issue the next value of the per-(office, day) booking sequence.
    ///
    /// Must be atomic: two concurrent bookings receive distinct values.
    /// Sequences start at 1 each day.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn next_daily_sequence(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<u32, TokenStoreError>> + Send + '_>>;

    /// Atomically transition one token, conditional on its current
    /// status being in `expected`.
    ///
    /// Returns the token after the change.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such token
    /// - `InvalidState`: current status not in `expected` (carries the
    ///   observed status)
    /// - `Database`: connection or query failure
    fn transition(
        &self,
        token_id: TokenId,
        expected: Vec<TokenStatus>,
        change: StatusChange,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>>;

    /// Complete the office's serving token (if any) and promote the FIFO
    /// head among the day's queue-eligible tokens (if any), as one
    /// office-serialized step.
    ///
    /// The selection rule is [`crate::ordering::advance_plan`]; this
    /// method only adds durability and mutual exclusion. After it
    /// returns, at most one token is serving for the office - under any
    /// interleaving of concurrent calls.
    ///
    /// An empty queue is a valid outcome ([`Advance::is_noop`] or a
    /// completion with no successor), not an error.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn advance(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
        now: DateTime<Utc>,
        official_id: OfficialId,
    ) -> Pin<Box<dyn Future<Output = Result<Advance, TokenStoreError>> + Send + '_>>;

    /// `served_at` timestamps of the office's most recently completed
    /// tokens, newest first, at most `limit`. Feeds the wait estimator.
    ///
    /// # Errors
    ///
    /// - `Database`: connection or query failure
    fn recent_completions(
        &self,
        office_id: OfficeId,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DateTime<Utc>>, TokenStoreError>> + Send + '_>>;
}

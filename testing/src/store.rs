//! In-memory token store for fast, deterministic testing.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning is a test bug, not an API contract

use chrono::{DateTime, NaiveDate, Utc};
use janseva_core::ordering::advance_plan;
use janseva_core::status::TokenStatus;
use janseva_core::store::{Advance, StatusChange, TokenStore, TokenStoreError};
use janseva_core::types::{CitizenId, OfficeId, OfficialId, Token, TokenId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// In-memory [`TokenStore`] with the production concurrency contract.
///
/// All mutation happens inside a single write-lock critical section, so
/// `transition` is a true compare-and-swap and `advance` recomputes its
/// plan under exclusion - two interleaved advances can never both
/// promote.
///
/// # Example
///
/// ```
/// use janseva_testing::InMemoryTokenStore;
///
/// let store = InMemoryTokenStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<TokenId, Token>>>,
    sequences: Arc<RwLock<HashMap<(OfficeId, NaiveDate), u32>>>,
}

impl InMemoryTokenStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().unwrap().len()
    }

    /// Whether the store holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().unwrap().is_empty()
    }

    /// Remove all tokens and sequences (for test isolation).
    pub fn clear(&self) {
        self.tokens.write().unwrap().clear();
        self.sequences.write().unwrap().clear();
    }

    /// Seed a token directly, bypassing admission (for arranging test
    /// state).
    ///
    /// Keeps the daily-sequence counter consistent with the seeded token
    /// so the mock mirrors the production invariant that every issued
    /// token number has consumed a sequence value - otherwise a later
    /// [`TokenStore::next_daily_sequence`] could re-issue a number the
    /// seeded token already holds.
    pub fn seed(&self, token: Token) {
        if let Some(sequence) = sequence_of(&token) {
            let mut sequences = self.sequences.write().unwrap();
            let counter = sequences
                .entry((token.office_id.clone(), token.appointment_date))
                .or_insert(0);
            *counter = (*counter).max(sequence);
        }
        self.tokens.write().unwrap().insert(token.id, token);
    }

    fn snapshot_active(
        tokens: &HashMap<TokenId, Token>,
        office_id: &OfficeId,
        date: NaiveDate,
    ) -> Vec<Token> {
        tokens
            .values()
            .filter(|t| {
                &t.office_id == office_id && t.appointment_date == date && t.status.is_active()
            })
            .cloned()
            .collect()
    }
}

/// Parse the daily sequence encoded in a token number's trailing
/// `-NNN` segment (see [`janseva_core::types::TokenNumber::compose`]).
fn sequence_of(token: &Token) -> Option<u32> {
    token
        .token_number
        .as_str()
        .rsplit('-')
        .next()
        .and_then(|digits| digits.parse().ok())
}

impl TokenStore for InMemoryTokenStore {
    fn insert(
        &self,
        token: Token,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            let duplicate = tokens.values().any(|t| {
                t.office_id == token.office_id && t.token_number == token.token_number
            });
            if duplicate {
                return Err(TokenStoreError::DuplicateTokenNumber(token.token_number));
            }
            tokens.insert(token.id, token.clone());
            Ok(token)
        })
    }

    fn get(
        &self,
        token_id: TokenId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move { Ok(self.tokens.read().unwrap().get(&token_id).cloned()) })
    }

    fn active_for_office(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let tokens = self.tokens.read().unwrap();
            Ok(Self::snapshot_active(&tokens, &office_id, date))
        })
    }

    fn for_owner(
        &self,
        owner_id: CitizenId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let tokens = self.tokens.read().unwrap();
            Ok(tokens
                .values()
                .filter(|t| t.owner_id == owner_id)
                .cloned()
                .collect())
        })
    }

    fn for_office_date(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let tokens = self.tokens.read().unwrap();
            Ok(tokens
                .values()
                .filter(|t| t.office_id == office_id && t.appointment_date == date)
                .cloned()
                .collect())
        })
    }

    fn next_daily_sequence(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<u32, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut sequences = self.sequences.write().unwrap();
            let counter = sequences.entry((office_id, date)).or_insert(0);
            *counter += 1;
            Ok(*counter)
        })
    }

    fn transition(
        &self,
        token_id: TokenId,
        expected: Vec<TokenStatus>,
        change: StatusChange,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut tokens = self.tokens.write().unwrap();
            let token = tokens
                .get_mut(&token_id)
                .ok_or(TokenStoreError::NotFound(token_id))?;
            if !expected.contains(&token.status) {
                return Err(TokenStoreError::InvalidState {
                    current: token.status,
                });
            }
            change.apply(token);
            Ok(token.clone())
        })
    }

    fn advance(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
        now: DateTime<Utc>,
        official_id: OfficialId,
    ) -> Pin<Box<dyn Future<Output = Result<Advance, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            // Plan and apply under one write lock: the in-memory
            // equivalent of the Postgres store's office-scoped
            // transaction.
            let mut tokens = self.tokens.write().unwrap();
            let active = Self::snapshot_active(&tokens, &office_id, date);
            let plan = advance_plan(&active, date);

            let mut outcome = Advance::default();
            if let Some(id) = plan.complete {
                let token = tokens.get_mut(&id).ok_or(TokenStoreError::NotFound(id))?;
                StatusChange {
                    to: TokenStatus::Completed,
                    at: now,
                    by: Some(official_id),
                }
                .apply(token);
                outcome.completed = Some(token.clone());
            }
            if let Some(id) = plan.promote {
                let token = tokens.get_mut(&id).ok_or(TokenStoreError::NotFound(id))?;
                StatusChange {
                    to: TokenStatus::Serving,
                    at: now,
                    by: None,
                }
                .apply(token);
                outcome.serving = Some(token.clone());
            }
            Ok(outcome)
        })
    }

    fn recent_completions(
        &self,
        office_id: OfficeId,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DateTime<Utc>>, TokenStoreError>> + Send + '_>>
    {
        Box::pin(async move {
            let tokens = self.tokens.read().unwrap();
            let mut completions: Vec<DateTime<Utc>> = tokens
                .values()
                .filter(|t| t.office_id == office_id && t.status == TokenStatus::Completed)
                .filter_map(|t| t.served_at)
                .collect();
            completions.sort_unstable_by(|a, b| b.cmp(a));
            completions.truncate(limit as usize);
            Ok(completions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TokenFixture;
    use crate::mocks::test_clock;
    use janseva_core::environment::Clock;

    #[tokio::test]
    async fn sequences_are_distinct_per_day() {
        let store = InMemoryTokenStore::new();
        let office = OfficeId::new("rto-pune");
        let day = test_clock().today();

        let first = store
            .next_daily_sequence(office.clone(), day)
            .await
            .unwrap();
        let second = store
            .next_daily_sequence(office.clone(), day)
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let next_day = day.succ_opt().unwrap();
        let fresh = store.next_daily_sequence(office, next_day).await.unwrap();
        assert_eq!(fresh, 1);
    }

    #[tokio::test]
    async fn transition_rejects_unexpected_status() {
        let store = InMemoryTokenStore::new();
        let clock = test_clock();
        let token = TokenFixture::new("rto-pune", clock.today())
            .status(TokenStatus::Completed)
            .build();
        store.seed(token.clone());

        let result = store
            .transition(
                token.id,
                vec![TokenStatus::Pending, TokenStatus::Waiting],
                StatusChange {
                    to: TokenStatus::Cancelled,
                    at: clock.now(),
                    by: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(TokenStoreError::InvalidState {
                current: TokenStatus::Completed
            })
        ));
    }

    #[tokio::test]
    async fn duplicate_token_numbers_are_rejected() {
        let store = InMemoryTokenStore::new();
        let day = test_clock().today();
        let token = TokenFixture::new("rto-pune", day).sequence(1).build();
        let twin = TokenFixture::new("rto-pune", day).sequence(1).build();

        store.insert(token).await.unwrap();
        let result = store.insert(twin).await;
        assert!(matches!(
            result,
            Err(TokenStoreError::DuplicateTokenNumber(_))
        ));
    }

    #[tokio::test]
    async fn advance_completes_then_promotes() {
        let store = InMemoryTokenStore::new();
        let clock = test_clock();
        let day = clock.today();
        let serving = TokenFixture::new("rto-pune", day)
            .sequence(1)
            .status(TokenStatus::Serving)
            .build();
        let waiting = TokenFixture::new("rto-pune", day)
            .sequence(2)
            .status(TokenStatus::Waiting)
            .created_offset_secs(10)
            .build();
        store.seed(serving.clone());
        store.seed(waiting.clone());

        let official = OfficialId::new();
        let outcome = store
            .advance(OfficeId::new("rto-pune"), day, clock.now(), official)
            .await
            .unwrap();

        let completed = outcome.completed.unwrap();
        assert_eq!(completed.id, serving.id);
        assert_eq!(completed.status, TokenStatus::Completed);
        assert_eq!(completed.served_by, Some(official));

        let promoted = outcome.serving.unwrap();
        assert_eq!(promoted.id, waiting.id);
        assert_eq!(promoted.status, TokenStatus::Serving);
        assert_eq!(promoted.served_at, None);
    }
}

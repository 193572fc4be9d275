//! Write side: queue advancement and status transitions.
//!
//! Three mutations exist, and none of them is a read-then-write at this
//! layer:
//!
//! - `call_next` delegates to the store's office-serialized `advance`
//!   primitive, so two simultaneous calls for one office can never both
//!   promote.
//! - `set_status` and `cancel_token` are per-row conditional
//!   transitions; a race resolves to one winner and one conflict.
//!
//! Expected-status sets passed to the store are derived from the
//! transition table, so an illegal lifecycle step cannot reach storage.

use crate::engine::QueueEngine;
use crate::metrics;
use janseva_core::error::QueueError;
use janseva_core::status::{TokenOutcome, TokenStatus};
use janseva_core::store::{StatusChange, TokenStore, TokenStoreError};
use janseva_core::types::{CitizenId, OfficeId, Official, Token, TokenId};

impl QueueEngine {
    /// Complete the currently serving token (if any) and promote the
    /// next eligible waiting token for today.
    ///
    /// Returns the newly serving token, or `None` if the queue was
    /// empty - a valid observation, not a failure. When the queue is
    /// empty and a token was serving, that token is still completed.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: unknown office, or the official is
    ///   not assigned to it
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self, official), fields(office = %office_id, official = %official.id))]
    pub async fn call_next(
        &self,
        official: &Official,
        office_id: &OfficeId,
    ) -> Result<Option<Token>, QueueError> {
        self.require_office(office_id)?;
        Self::require_assignment(official, office_id)?;

        let outcome = self
            .store
            .advance(
                office_id.clone(),
                self.clock.today(),
                self.clock.now(),
                official.id,
            )
            .await?;

        if let Some(completed) = &outcome.completed {
            tracing::info!(token = %completed.token_number, "serving token completed");
            metrics::record_finalized("completed");
            self.signal_change(completed).await;
        }
        if let Some(serving) = &outcome.serving {
            tracing::info!(token = %serving.token_number, "token now serving");
            self.signal_change(serving).await;
        }
        if !outcome.is_noop() {
            metrics::record_advance();
        }

        Ok(outcome.serving)
    }

    /// Record a terminal outcome for a token: `completed` or `skipped`.
    ///
    /// Completion requires the token to be waiting or serving; a skip is
    /// also accepted for a pending token (the queue treats pending as
    /// waiting, and no-shows booked same-day must be clearable). No
    /// replacement is promoted - that is `call_next`'s job.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: unknown token, or the official is
    ///   not assigned to the token's office
    /// - [`QueueError::Conflict`]: the token is already finalized, or
    ///   not in an eligible status
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self, official), fields(token = %token_id, official = %official.id, %outcome))]
    pub async fn set_status(
        &self,
        official: &Official,
        token_id: TokenId,
        outcome: TokenOutcome,
    ) -> Result<(), QueueError> {
        let token = self
            .store
            .get(token_id)
            .await?
            .ok_or_else(|| QueueError::validation(format!("unknown token: {token_id}")))?;
        Self::require_assignment(official, &token.office_id)?;

        let expected = match outcome {
            TokenOutcome::Completed => vec![TokenStatus::Waiting, TokenStatus::Serving],
            TokenOutcome::Skipped => vec![
                TokenStatus::Pending,
                TokenStatus::Waiting,
                TokenStatus::Serving,
            ],
        };

        let change = StatusChange {
            to: outcome.status(),
            at: self.clock.now(),
            by: Some(official.id),
        };
        let token = self
            .store
            .transition(token_id, expected, change)
            .await
            .map_err(|e| Self::transition_conflict(e, "finalize"))?;

        tracing::info!(token = %token.token_number, %outcome, "token finalized");
        metrics::record_finalized(match outcome {
            TokenOutcome::Completed => "completed",
            TokenOutcome::Skipped => "skipped",
        });
        self.signal_change(&token).await;
        Ok(())
    }

    /// Withdraw a token, by its owner, while it is still pending or
    /// waiting. Serving and finalized tokens cannot be cancelled.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: unknown token, or the caller does
    ///   not own it
    /// - [`QueueError::Conflict`]: the token is serving or already
    ///   terminal
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self), fields(token = %token_id, owner = %owner_id))]
    pub async fn cancel_token(
        &self,
        owner_id: CitizenId,
        token_id: TokenId,
    ) -> Result<(), QueueError> {
        let token = self
            .store
            .get(token_id)
            .await?
            .ok_or_else(|| QueueError::validation(format!("unknown token: {token_id}")))?;
        if token.owner_id != owner_id {
            return Err(QueueError::validation(
                "token does not belong to the caller",
            ));
        }

        let change = StatusChange {
            to: TokenStatus::Cancelled,
            at: self.clock.now(),
            by: None,
        };
        let token = self
            .store
            .transition(
                token_id,
                vec![TokenStatus::Pending, TokenStatus::Waiting],
                change,
            )
            .await
            .map_err(|e| Self::transition_conflict(e, "cancel"))?;

        tracing::info!(token = %token.token_number, "token cancelled");
        metrics::record_cancellation();
        self.signal_change(&token).await;
        Ok(())
    }

    fn require_assignment(official: &Official, office_id: &OfficeId) -> Result<(), QueueError> {
        if &official.office_id == office_id {
            Ok(())
        } else {
            Err(QueueError::validation(format!(
                "official {} is not assigned to office {office_id}",
                official.id
            )))
        }
    }

    /// Turn a failed conditional transition into a caller-facing error.
    fn transition_conflict(error: TokenStoreError, verb: &str) -> QueueError {
        match error {
            TokenStoreError::InvalidState { current } if current.is_terminal() => {
                QueueError::conflict(format!("token already finalized as {current}"))
            }
            TokenStoreError::InvalidState { current } => {
                QueueError::conflict(format!("cannot {verb} a token that is {current}"))
            }
            other => QueueError::Store(other),
        }
    }
}

//! Read side: the queue projection and citizen/dashboard views.
//!
//! Pure reads over the store. The queue view is recomputed on every
//! request - positions and wait estimates are never served from the
//! persisted display cache, which exists only so detail pages can render
//! a token without a queue read.

use crate::engine::QueueEngine;
use chrono::NaiveDate;
use janseva_core::error::QueueError;
use janseva_core::ordering::partition_queue;
use janseva_core::status::TokenStatus;
use janseva_core::store::TokenStore;
use janseva_core::types::{CitizenId, OfficeId, QueueStats, QueueView, Token};

impl QueueEngine {
    /// The ordered queue for an office and day.
    ///
    /// Pending tokens count as waiting; ordering is FIFO by creation
    /// time with the token id as deterministic tie-break. Each waiting
    /// token carries a fresh 1-based position and wait estimate.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: unknown office
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self), fields(office = %office_id, %date))]
    pub async fn queue(
        &self,
        office_id: &OfficeId,
        date: NaiveDate,
    ) -> Result<QueueView, QueueError> {
        let office = self.require_office(office_id)?;
        let active = self
            .store
            .active_for_office(office_id.clone(), date)
            .await?;

        let (serving, mut waiting) = partition_queue(active);
        let average = self.average_service_minutes(office_id, &office).await;
        for token in &mut waiting {
            token.estimated_wait_minutes = token
                .position_in_queue
                .map(|position| self.estimator.estimate(position, average));
        }

        Ok(QueueView { serving, waiting })
    }

    /// Every token a citizen owns, newest appointment first.
    ///
    /// Position/estimate fields reflect the persisted display cache and
    /// may lag the live queue; the queue view is the authority.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self), fields(owner = %owner_id))]
    pub async fn my_tokens(&self, owner_id: CitizenId) -> Result<Vec<Token>, QueueError> {
        let mut tokens = self.store.for_owner(owner_id).await?;
        tokens.sort_by(|a, b| {
            b.appointment_date
                .cmp(&a.appointment_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(tokens)
    }

    /// Day counters for an office's dashboard: everything booked today,
    /// split into waiting (pending + waiting), serving, and served.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: unknown office
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self), fields(office = %office_id))]
    pub async fn today_stats(&self, office_id: &OfficeId) -> Result<QueueStats, QueueError> {
        self.require_office(office_id)?;
        let today = self.clock.today();
        let tokens = self
            .store
            .for_office_date(office_id.clone(), today)
            .await?;

        let mut stats = QueueStats {
            total: tokens.len() as u64,
            ..QueueStats::default()
        };
        for token in &tokens {
            match token.status {
                TokenStatus::Pending | TokenStatus::Waiting => stats.waiting += 1,
                TokenStatus::Serving => stats.serving += 1,
                TokenStatus::Completed => stats.served += 1,
                TokenStatus::Skipped | TokenStatus::Cancelled => {}
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use janseva_core::environment::Clock;
    use janseva_testing::{
        InMemoryTokenStore, RecordingNotifier, StaticCatalog, TokenFixture, test_clock,
    };
    use std::sync::Arc;

    fn engine_with_store() -> (QueueEngine, Arc<InMemoryTokenStore>) {
        let store = Arc::new(InMemoryTokenStore::new());
        let engine = QueueEngine::new(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(StaticCatalog::rto_pune()),
            Arc::new(test_clock()),
            EngineConfig::default(),
        );
        (engine, store)
    }

    #[tokio::test]
    async fn queue_orders_waiting_fifo() {
        let (engine, store) = engine_with_store();
        let today = test_clock().today();
        let t1 = TokenFixture::new("rto-pune", today)
            .sequence(1)
            .created_offset_secs(0)
            .build();
        let t2 = TokenFixture::new("rto-pune", today)
            .sequence(2)
            .status(TokenStatus::Pending)
            .created_offset_secs(30)
            .build();
        store.seed(t2.clone());
        store.seed(t1.clone());

        let view = engine
            .queue(&OfficeId::new("rto-pune"), today)
            .await
            .unwrap();

        assert!(view.serving.is_none());
        let ids: Vec<_> = view.waiting.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1.id, t2.id]);
        assert_eq!(view.waiting[0].position_in_queue, Some(1));
        assert_eq!(view.waiting[1].position_in_queue, Some(2));
        // Cold start: default 20 minutes per position.
        assert_eq!(view.waiting[0].estimated_wait_minutes, Some(20));
        assert_eq!(view.waiting[1].estimated_wait_minutes, Some(40));
    }

    #[tokio::test]
    async fn queue_excludes_terminal_and_separates_serving() {
        let (engine, store) = engine_with_store();
        let today = test_clock().today();
        let serving = TokenFixture::new("rto-pune", today)
            .sequence(1)
            .status(TokenStatus::Serving)
            .build();
        let cancelled = TokenFixture::new("rto-pune", today)
            .sequence(2)
            .status(TokenStatus::Cancelled)
            .created_offset_secs(10)
            .build();
        store.seed(serving.clone());
        store.seed(cancelled);

        let view = engine
            .queue(&OfficeId::new("rto-pune"), today)
            .await
            .unwrap();

        assert_eq!(view.serving.map(|t| t.id), Some(serving.id));
        assert!(view.waiting.is_empty());
    }

    #[tokio::test]
    async fn my_tokens_newest_appointment_first() {
        let (engine, store) = engine_with_store();
        let owner = CitizenId::new();
        let today = test_clock().today();
        let earlier = TokenFixture::new("rto-pune", today)
            .owner(owner)
            .sequence(1)
            .build();
        let later = TokenFixture::new("rto-pune", today.succ_opt().unwrap())
            .owner(owner)
            .sequence(1)
            .status(TokenStatus::Pending)
            .build();
        store.seed(earlier.clone());
        store.seed(later.clone());
        store.seed(TokenFixture::new("rto-pune", today).sequence(3).build());

        let tokens = engine.my_tokens(owner).await.unwrap();
        let ids: Vec<_> = tokens.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![later.id, earlier.id]);
    }

    #[tokio::test]
    async fn stats_split_by_status() {
        let (engine, store) = engine_with_store();
        let today = test_clock().today();
        for (seq, status) in [
            (1, TokenStatus::Waiting),
            (2, TokenStatus::Pending),
            (3, TokenStatus::Serving),
            (4, TokenStatus::Completed),
            (5, TokenStatus::Cancelled),
        ] {
            store.seed(
                TokenFixture::new("rto-pune", today)
                    .sequence(seq)
                    .status(status)
                    .build(),
            );
        }

        let stats = engine
            .today_stats(&OfficeId::new("rto-pune"))
            .await
            .unwrap();
        assert_eq!(
            stats,
            QueueStats {
                total: 5,
                waiting: 2,
                serving: 1,
                served: 1,
            }
        );
    }
}

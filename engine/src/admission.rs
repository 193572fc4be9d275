//! Admission: turning a booking request into a durable token.
//!
//! Admission choice (documented, per the engine's contract): a booking
//! for **today** is admitted straight into the live queue as `waiting`;
//! a booking for a future day is stored as `pending` and becomes
//! queue-eligible on its appointment day through the projection's
//! pending-as-waiting rule. Either way the token's position/estimate
//! fields are seeded as a display cache - the projection recomputes both
//! on every read.

use crate::engine::QueueEngine;
use crate::metrics;
use janseva_core::catalog::OfficeProfile;
use janseva_core::error::QueueError;
use janseva_core::status::TokenStatus;
use janseva_core::store::TokenStore;
use janseva_core::types::{BookingRequest, CitizenId, OfficeId, Token, TokenId, TokenNumber};

impl QueueEngine {
    /// Book a token for a citizen.
    ///
    /// Validates the request against the catalog and the office's daily
    /// capacity, issues the office's next daily number, and durably
    /// inserts the token. The only state mutated is the insert itself.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`]: past date, unknown office/service
    /// - [`QueueError::Capacity`]: the office's daily limit is reached
    /// - [`QueueError::Store`]: storage failure
    #[tracing::instrument(skip(self, request), fields(office = %request.office_id, date = %request.appointment_date))]
    pub async fn book_token(
        &self,
        owner_id: CitizenId,
        request: BookingRequest,
    ) -> Result<Token, QueueError> {
        let office = self.require_office(&request.office_id)?;
        let service = self
            .catalog
            .service(&request.office_id, &request.service_id)
            .ok_or_else(|| {
                QueueError::validation(format!(
                    "service {} is not offered at {}",
                    request.service_id, request.office_id
                ))
            })?;

        let today = self.clock.today();
        if request.appointment_date < today {
            return Err(QueueError::validation(
                "appointment date must not be in the past",
            ));
        }

        self.check_capacity(&request, &office).await?;

        let sequence = self
            .store
            .next_daily_sequence(request.office_id.clone(), request.appointment_date)
            .await?;
        let token_number =
            TokenNumber::compose(&request.office_id, request.appointment_date, sequence);

        // Same-day bookings join the live queue immediately.
        let status = if request.appointment_date == today {
            TokenStatus::Waiting
        } else {
            TokenStatus::Pending
        };

        let (position, estimate) = self.seed_queue_cache(&request, &office).await?;

        let now = self.clock.now();
        let token = Token {
            id: TokenId::new(),
            token_number,
            owner_id,
            office_id: request.office_id,
            office_name: office.name,
            service_id: request.service_id,
            service_name: service.name,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            status,
            position_in_queue: Some(position),
            estimated_wait_minutes: Some(estimate),
            created_at: now,
            updated_at: now,
            served_at: None,
            served_by: None,
        };

        let token = self.store.insert(token).await?;
        tracing::info!(token = %token.token_number, position, "token booked");
        metrics::record_booking(estimate);
        self.signal_change(&token).await;
        Ok(token)
    }

    /// Reject the booking if the office's daily limit is reached.
    ///
    /// Cancelled tokens release their slot; everything else booked for
    /// the day counts against the limit.
    async fn check_capacity(
        &self,
        request: &BookingRequest,
        office: &OfficeProfile,
    ) -> Result<(), QueueError> {
        let booked = self
            .store
            .for_office_date(request.office_id.clone(), request.appointment_date)
            .await?
            .iter()
            .filter(|t| t.status != TokenStatus::Cancelled)
            .count();

        if booked >= office.policy.daily_capacity as usize {
            return Err(QueueError::Capacity {
                office_id: request.office_id.to_string(),
                limit: office.policy.daily_capacity,
            });
        }
        Ok(())
    }

    /// Provisional position and wait estimate for the day's queue.
    async fn seed_queue_cache(
        &self,
        request: &BookingRequest,
        office: &OfficeProfile,
    ) -> Result<(u32, u32), QueueError> {
        let active = self
            .store
            .active_for_office(request.office_id.clone(), request.appointment_date)
            .await?;
        let depth = active
            .iter()
            .filter(|t| t.status.is_queue_eligible())
            .count();
        #[allow(clippy::cast_possible_truncation)] // bounded by daily capacity
        let position = depth as u32 + 1;

        let average = self.average_service_minutes(&request.office_id, office).await;
        Ok((position, self.estimator.estimate(position, average)))
    }

    /// Per-token average for an office, degrading to the office default
    /// on cold start or store failure (estimates are advisory).
    pub(crate) async fn average_service_minutes(
        &self,
        office_id: &OfficeId,
        office: &OfficeProfile,
    ) -> u32 {
        let default_minutes = office.policy.default_service_minutes;
        match self
            .store
            .recent_completions(office_id.clone(), self.estimator.history_window())
            .await
        {
            Ok(completions) => self.estimator.average_minutes(&completions, default_minutes),
            Err(error) => {
                tracing::debug!(%error, %office_id, "completion history unavailable, using default");
                default_minutes
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use chrono::Duration;
    use janseva_core::environment::Clock;
    use janseva_testing::{
        InMemoryTokenStore, RecordingNotifier, StaticCatalog, TokenFixture, test_clock,
    };
    use std::sync::Arc;

    fn engine_with_store() -> (QueueEngine, Arc<InMemoryTokenStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(InMemoryTokenStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = QueueEngine::new(
            store.clone(),
            notifier.clone(),
            Arc::new(StaticCatalog::rto_pune()),
            Arc::new(test_clock()),
            EngineConfig::default(),
        );
        (engine, store, notifier)
    }

    fn request_for(date: chrono::NaiveDate) -> BookingRequest {
        BookingRequest {
            office_id: "rto-pune".parse().unwrap(),
            service_id: "learning-licence".parse().unwrap(),
            appointment_date: date,
            appointment_time: "09:00".to_string(),
        }
    }

    #[tokio::test]
    async fn same_day_booking_is_waiting_with_position_one() {
        let (engine, _, notifier) = engine_with_store();
        let today = test_clock().today();

        let token = engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();

        assert_eq!(token.status, TokenStatus::Waiting);
        assert_eq!(token.position_in_queue, Some(1));
        assert_eq!(token.token_number.as_str(), "RTO-PUNE-20250114-001");
        // Cold start: default 20 minutes for position 1.
        assert_eq!(token.estimated_wait_minutes, Some(20));
        assert_eq!(notifier.published().len(), 1);
    }

    #[tokio::test]
    async fn future_booking_stays_pending() {
        let (engine, _, _) = engine_with_store();
        let next_week = test_clock().today() + Duration::days(7);

        let token = engine
            .book_token(CitizenId::new(), request_for(next_week))
            .await
            .unwrap();

        assert_eq!(token.status, TokenStatus::Pending);
        assert_eq!(token.position_in_queue, Some(1));
    }

    #[tokio::test]
    async fn successive_bookings_take_successive_positions() {
        let (engine, _, _) = engine_with_store();
        let today = test_clock().today();

        let first = engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();
        let second = engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();

        assert_eq!(first.position_in_queue, Some(1));
        assert_eq!(second.position_in_queue, Some(2));
        assert_ne!(first.token_number, second.token_number);
    }

    #[tokio::test]
    async fn past_date_is_rejected() {
        let (engine, _, _) = engine_with_store();
        let yesterday = test_clock().today() - Duration::days(1);

        let result = engine
            .book_token(CitizenId::new(), request_for(yesterday))
            .await;
        assert!(matches!(result, Err(QueueError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_office_and_service_are_rejected() {
        let (engine, _, _) = engine_with_store();
        let today = test_clock().today();

        let mut unknown_office = request_for(today);
        unknown_office.office_id = "rto-nowhere".parse().unwrap();
        assert!(matches!(
            engine.book_token(CitizenId::new(), unknown_office).await,
            Err(QueueError::Validation(_))
        ));

        let mut unknown_service = request_for(today);
        unknown_service.service_id = "passport-renewal".parse().unwrap();
        assert!(matches!(
            engine.book_token(CitizenId::new(), unknown_service).await,
            Err(QueueError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn capacity_limit_rejects_booking() {
        let store = Arc::new(InMemoryTokenStore::new());
        let catalog = StaticCatalog::new()
            .with_office(
                "rto-pune",
                "RTO Pune",
                janseva_core::catalog::OfficePolicy {
                    daily_capacity: 2,
                    default_service_minutes: 20,
                },
            )
            .with_service("rto-pune", "learning-licence", "Learning Licence");
        let engine = QueueEngine::new(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(catalog),
            Arc::new(test_clock()),
            EngineConfig::default(),
        );
        let today = test_clock().today();

        engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();
        engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();

        let result = engine.book_token(CitizenId::new(), request_for(today)).await;
        assert!(matches!(result, Err(QueueError::Capacity { limit: 2, .. })));
    }

    #[tokio::test]
    async fn cancelled_tokens_release_capacity() {
        let store = Arc::new(InMemoryTokenStore::new());
        let catalog = StaticCatalog::new()
            .with_office(
                "rto-pune",
                "RTO Pune",
                janseva_core::catalog::OfficePolicy {
                    daily_capacity: 1,
                    default_service_minutes: 20,
                },
            )
            .with_service("rto-pune", "learning-licence", "Learning Licence");
        let engine = QueueEngine::new(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(catalog),
            Arc::new(test_clock()),
            EngineConfig::default(),
        );
        let today = test_clock().today();
        store.seed(
            TokenFixture::new("rto-pune", today)
                .status(TokenStatus::Cancelled)
                .build(),
        );

        let token = engine
            .book_token(CitizenId::new(), request_for(today))
            .await
            .unwrap();
        assert_eq!(token.status, TokenStatus::Waiting);
    }
}

//! The engine facade: construction and shared plumbing.

use crate::estimator::WaitEstimator;
use crate::{EstimatorConfig, metrics};
use janseva_core::catalog::{OfficeCatalog, OfficeProfile};
use janseva_core::environment::Clock;
use janseva_core::error::QueueError;
use janseva_core::notifier::{ChangeNotifier, ChangeStream, QueueSignal, QueueTopic};
use janseva_core::store::TokenStore;
use janseva_core::types::{OfficeId, Token};
use std::sync::Arc;

/// Tunables for an engine instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    /// Wait-estimator knobs.
    pub estimator: EstimatorConfig,
}

/// The queue engine.
///
/// Stateless: safe to clone, share, and run in parallel. All
/// synchronization lives in the store (see the
/// [`janseva_core::store::TokenStore`] concurrency contract).
#[derive(Clone)]
pub struct QueueEngine {
    pub(crate) store: Arc<dyn TokenStore>,
    pub(crate) notifier: Arc<dyn ChangeNotifier>,
    pub(crate) catalog: Arc<dyn OfficeCatalog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) estimator: WaitEstimator,
}

impl QueueEngine {
    /// Assemble an engine from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn ChangeNotifier>,
        catalog: Arc<dyn OfficeCatalog>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        metrics::register_queue_metrics();
        Self {
            store,
            notifier,
            catalog,
            clock,
            estimator: WaitEstimator::new(config.estimator),
        }
    }

    /// Subscribe to change signals for the given topics.
    ///
    /// Consumers must treat signals as refresh hints and re-read the
    /// queue projection; payloads carry no authoritative state.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Validation`] if the topic list is empty
    /// - [`QueueError::Notify`] if the subscription cannot be
    ///   established
    pub async fn subscribe(&self, topics: Vec<QueueTopic>) -> Result<ChangeStream, QueueError> {
        if topics.is_empty() {
            return Err(QueueError::validation("at least one topic is required"));
        }
        Ok(self.notifier.subscribe(topics).await?)
    }

    /// The engine's notion of the current queue day.
    ///
    /// Exposed so transports can default date parameters to the same
    /// "today" the advancer uses.
    #[must_use]
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Resolve an office against the catalog or fail validation.
    pub(crate) fn require_office(&self, office_id: &OfficeId) -> Result<OfficeProfile, QueueError> {
        self.catalog
            .office(office_id)
            .ok_or_else(|| QueueError::validation(format!("unknown office: {office_id}")))
    }

    /// Publish a change signal for a mutated token.
    ///
    /// Signals are advisory: a notifier failure is logged and swallowed
    /// so it can never roll back a committed mutation.
    pub(crate) async fn signal_change(&self, token: &Token) {
        let signal = QueueSignal {
            office_id: token.office_id.clone(),
            date: token.appointment_date,
            owner_id: token.owner_id,
            token_id: token.id,
        };
        if let Err(error) = self.notifier.publish(signal).await {
            tracing::warn!(%error, token_id = %token.id, "change signal dropped");
        }
    }
}

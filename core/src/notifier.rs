//! Change notification for queue state.
//!
//! Subscribers register interest in an office (officials watching a
//! counter) or a citizen (the "my tokens" view) and receive lightweight
//! "queue changed" signals whenever a token mutates.
//!
//! # Key Principles
//!
//! - **Signals carry no authoritative payload**: a [`QueueSignal`] names
//!   what changed, but consumers always reconcile by re-reading the
//!   queue projection. Nothing here requires ordered or lossless
//!   delivery.
//! - **At-least-once**: duplicates are harmless because consumers
//!   re-derive state rather than applying deltas.
//! - **Lag is survivable**: an implementation may drop signals for a
//!   slow subscriber; the next signal (or a manual refresh) repairs the
//!   view.

use crate::types::{CitizenId, OfficeId, TokenId};
use chrono::NaiveDate;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during notifier operations.
#[derive(Error, Debug, Clone)]
pub enum NotifierError {
    /// Failed to publish a signal.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Failed to establish a subscription.
    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),

    /// The notifier is shutting down.
    #[error("Notifier closed")]
    Closed,
}

/// A subscription key: one office's queue, or one citizen's tokens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueTopic {
    /// All changes touching an office's queue.
    Office(OfficeId),
    /// All changes touching tokens owned by a citizen.
    Citizen(CitizenId),
}

/// A lightweight "something changed" signal.
///
/// Identifies the touched token and both routing keys so one publish
/// reaches office watchers and the owner alike.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSignal {
    /// Office whose queue changed.
    pub office_id: OfficeId,
    /// Queue day of the touched token.
    pub date: NaiveDate,
    /// Owner of the touched token.
    pub owner_id: CitizenId,
    /// The touched token.
    pub token_id: TokenId,
}

impl QueueSignal {
    /// Whether this signal matches a subscription topic.
    #[must_use]
    pub fn matches(&self, topic: &QueueTopic) -> bool {
        match topic {
            QueueTopic::Office(office_id) => &self.office_id == office_id,
            QueueTopic::Citizen(owner_id) => &self.owner_id == owner_id,
        }
    }
}

/// Stream of change signals delivered to a subscriber.
pub type ChangeStream = Pin<Box<dyn Stream<Item = QueueSignal> + Send>>;

/// Publish/subscribe channel for queue-change signals.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the engine publishes from
/// every request handler and holds the notifier as
/// `Arc<dyn ChangeNotifier>`.
///
/// # Dyn Compatibility
///
/// Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn`
/// to keep the trait object-safe.
pub trait ChangeNotifier: Send + Sync {
    /// Publish a signal to every matching subscriber.
    ///
    /// Delivery is at-least-once toward live subscribers; publishing to
    /// zero subscribers succeeds silently.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::PublishFailed`] if the underlying
    /// channel rejects the signal.
    fn publish(
        &self,
        signal: QueueSignal,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifierError>> + Send + '_>>;

    /// Subscribe to one or more topics and receive a merged stream of
    /// matching signals.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::SubscriptionFailed`] if the subscription
    /// cannot be established.
    fn subscribe(
        &self,
        topics: Vec<QueueTopic>,
    ) -> Pin<Box<dyn Future<Output = Result<ChangeStream, NotifierError>> + Send + '_>>;
}

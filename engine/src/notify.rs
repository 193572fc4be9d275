//! Process-local change notifier.
//!
//! A single `tokio::sync::broadcast` channel fans every signal out to
//! all subscribers; each subscription filters down to its topics. This
//! is deliberately not a durable bus: the engine is single-node, signals
//! are refresh hints, and a lagged subscriber losing signals costs one
//! stale render until the next signal or manual refresh.

use futures::stream;
use janseva_core::notifier::{
    ChangeNotifier, ChangeStream, NotifierError, QueueSignal, QueueTopic,
};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::broadcast;

/// Default buffered signals per subscriber before lag kicks in.
const DEFAULT_CAPACITY: usize = 256;

/// [`ChangeNotifier`] over a tokio broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<QueueSignal>,
}

impl BroadcastNotifier {
    /// Create a notifier with the default per-subscriber buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a notifier with an explicit per-subscriber buffer.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn publish(
        &self,
        signal: QueueSignal,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifierError>> + Send + '_>> {
        Box::pin(async move {
            // Send only errs when nobody is subscribed, which is not a
            // failure for an advisory signal.
            let _ = self.sender.send(signal);
            Ok(())
        })
    }

    fn subscribe(
        &self,
        topics: Vec<QueueTopic>,
    ) -> Pin<Box<dyn Future<Output = Result<ChangeStream, NotifierError>> + Send + '_>> {
        Box::pin(async move {
            let receiver = self.sender.subscribe();
            let stream = stream::unfold(
                (receiver, topics),
                |(mut receiver, topics)| async move {
                    loop {
                        match receiver.recv().await {
                            Ok(signal) if topics.iter().any(|t| signal.matches(t)) => {
                                return Some((signal, (receiver, topics)));
                            }
                            Ok(_) => {}
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                tracing::debug!(skipped, "subscriber lagged; signals dropped");
                            }
                            Err(broadcast::error::RecvError::Closed) => return None,
                        }
                    }
                },
            );
            Ok(Box::pin(stream) as ChangeStream)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::StreamExt;
    use janseva_core::types::{CitizenId, OfficeId, TokenId};

    fn signal_for(office: &str, owner: CitizenId) -> QueueSignal {
        QueueSignal {
            office_id: OfficeId::new(office),
            date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            owner_id: owner,
            token_id: TokenId::new(),
        }
    }

    #[tokio::test]
    async fn office_subscribers_see_only_their_office() {
        let notifier = BroadcastNotifier::new();
        let mut stream = notifier
            .subscribe(vec![QueueTopic::Office(OfficeId::new("rto-pune"))])
            .await
            .unwrap();

        notifier
            .publish(signal_for("rto-mumbai", CitizenId::new()))
            .await
            .unwrap();
        notifier
            .publish(signal_for("rto-pune", CitizenId::new()))
            .await
            .unwrap();

        let received = stream.next().await.unwrap();
        assert_eq!(received.office_id, OfficeId::new("rto-pune"));
    }

    #[tokio::test]
    async fn citizen_subscribers_see_their_tokens_across_offices() {
        let notifier = BroadcastNotifier::new();
        let owner = CitizenId::new();
        let mut stream = notifier
            .subscribe(vec![QueueTopic::Citizen(owner)])
            .await
            .unwrap();

        notifier
            .publish(signal_for("rto-pune", owner))
            .await
            .unwrap();
        notifier
            .publish(signal_for("rto-mumbai", owner))
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().office_id, OfficeId::new("rto-pune"));
        assert_eq!(
            stream.next().await.unwrap().office_id,
            OfficeId::new("rto-mumbai")
        );
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let notifier = BroadcastNotifier::new();
        notifier
            .publish(signal_for("rto-pune", CitizenId::new()))
            .await
            .unwrap();
        assert_eq!(notifier.subscriber_count(), 0);
    }
}

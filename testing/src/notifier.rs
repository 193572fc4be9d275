//! Recording change notifier for assertions on published signals.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use futures::stream;
use janseva_core::notifier::{
    ChangeNotifier, ChangeStream, NotifierError, QueueSignal, QueueTopic,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// [`ChangeNotifier`] that records every published signal and forwards
/// them to live subscribers.
///
/// # Example
///
/// ```
/// use janseva_testing::RecordingNotifier;
///
/// let notifier = RecordingNotifier::new();
/// assert!(notifier.published().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    published: Arc<RwLock<Vec<QueueSignal>>>,
    subscribers: Arc<RwLock<Vec<(Vec<QueueTopic>, mpsc::UnboundedSender<QueueSignal>)>>>,
}

impl RecordingNotifier {
    /// Create a new notifier with no recorded signals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All signals published so far, in order.
    #[must_use]
    pub fn published(&self) -> Vec<QueueSignal> {
        self.published.read().unwrap().clone()
    }

    /// Drop recorded signals (for test isolation).
    pub fn clear(&self) {
        self.published.write().unwrap().clear();
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn publish(
        &self,
        signal: QueueSignal,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifierError>> + Send + '_>> {
        Box::pin(async move {
            self.published.write().unwrap().push(signal.clone());
            let mut subscribers = self.subscribers.write().unwrap();
            subscribers.retain(|(topics, sender)| {
                if topics.iter().any(|topic| signal.matches(topic)) {
                    sender.send(signal.clone()).is_ok()
                } else {
                    !sender.is_closed()
                }
            });
            Ok(())
        })
    }

    fn subscribe(
        &self,
        topics: Vec<QueueTopic>,
    ) -> Pin<Box<dyn Future<Output = Result<ChangeStream, NotifierError>> + Send + '_>> {
        Box::pin(async move {
            let (sender, receiver) = mpsc::unbounded_channel();
            self.subscribers.write().unwrap().push((topics, sender));
            let stream = stream::unfold(receiver, |mut receiver| async move {
                receiver.recv().await.map(|signal| (signal, receiver))
            });
            Ok(Box::pin(stream) as ChangeStream)
        })
    }
}

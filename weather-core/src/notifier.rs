//! In-process "a record was submitted" broadcast.
//!
//! The notifier is owned by the application root and handed to whoever needs
//! it by cloning. Publishers never wait on subscribers; subscribers hold a
//! [`Subscription`] and are unsubscribed when it is dropped.

use tokio::sync::broadcast::{self, error::RecvError};

const CHANNEL_CAPACITY: usize = 16;

/// Emitted after the service accepted a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEvent {
    pub record_id: String,
}

#[derive(Debug, Clone)]
pub struct SubmissionNotifier {
    trigger: broadcast::Sender<SubmissionEvent>,
}

impl Default for SubmissionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionNotifier {
    pub fn new() -> Self {
        let (trigger, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { trigger }
    }

    /// Fire-and-forget. Returns how many subscribers the event reached; zero
    /// subscribers is not an error.
    pub fn notify(&self, event: SubmissionEvent) -> usize {
        match self.trigger.send(event) {
            Ok(reached) => {
                tracing::debug!(subscribers = reached, "submission event sent");
                reached
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription { listener: self.trigger.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.trigger.receiver_count()
    }
}

/// A live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    listener: broadcast::Receiver<SubmissionEvent>,
}

impl Subscription {
    /// Wait for the next submission. Events missed while lagging collapse into
    /// one wake-up. Returns `None` once every notifier handle is gone.
    pub async fn next(&mut self) -> Option<SubmissionEvent> {
        loop {
            match self.listener.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "submission subscriber lagged");
                    // Drain to the newest event so a burst costs one refresh.
                    let mut latest = None;
                    while let Ok(event) = self.listener.try_recv() {
                        latest = Some(event);
                    }
                    if latest.is_some() {
                        return latest;
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

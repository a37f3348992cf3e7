//! Submissions feed: newest-first list of every stored record.
//!
//! A mounted [`FeedView`] refetches whenever the notifier reports a
//! submission. Fetch failures are logged and shown as an empty feed.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    error::FetchError,
    model::WeatherRecord,
    notifier::{SubmissionNotifier, Subscription},
    service::WeatherService,
};

/// Notes longer than this many characters are cut in feed entries.
pub const NOTES_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct FeedClient {
    service: Arc<dyn WeatherService>,
}

impl FeedClient {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service }
    }

    /// All records, newest first.
    ///
    /// The service lists records oldest first and has no sort parameter, so
    /// the order is reversed here. This is only correct while the service
    /// keeps returning records in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<WeatherRecord>, FetchError> {
        let mut records = self.service.list_records().await?;
        records.reverse();
        Ok(records)
    }

    /// `fetch_all` settled into a displayable state.
    pub async fn load(&self) -> FeedState {
        match self.fetch_all().await {
            Ok(records) if records.is_empty() => FeedState::Empty,
            Ok(records) => FeedState::Populated(records),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch submissions");
                FeedState::Empty
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Populated(Vec<WeatherRecord>),
    Empty,
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn entries(&self) -> Vec<FeedEntry> {
        match self {
            Self::Populated(records) => records.iter().map(FeedEntry::from).collect(),
            Self::Loading | Self::Empty => Vec::new(),
        }
    }
}

/// What a mounted feed currently shows. `generation` counts settled refreshes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub state: FeedState,
    pub generation: u64,
}

/// One rendered row of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub heading: String,
    pub date: String,
    pub notes_excerpt: Option<String>,
    pub id: String,
}

impl From<&WeatherRecord> for FeedEntry {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            heading: record.place(),
            date: record.date.clone(),
            notes_excerpt: record.notes().map(notes_excerpt),
            id: record.id.clone(),
        }
    }
}

pub fn notes_excerpt(notes: &str) -> String {
    match notes.char_indices().nth(NOTES_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &notes[..cut]),
        None => notes.to_string(),
    }
}

/// A feed mounted for display.
///
/// Subscribes to the notifier when created and refetches once per event.
/// Dropping the view (or calling [`FeedView::unmount`]) stops the background
/// task and releases the subscription.
#[derive(Debug)]
pub struct FeedView {
    snapshots: watch::Receiver<FeedSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl FeedView {
    /// Must be called from within a tokio runtime.
    pub fn mount(client: FeedClient, notifier: &SubmissionNotifier) -> Self {
        let subscription = notifier.subscribe();
        let (tx, snapshots) =
            watch::channel(FeedSnapshot { state: FeedState::Loading, generation: 0 });

        let task = tokio::spawn(run_feed(client, subscription, tx));
        tracing::debug!("feed mounted");

        Self { snapshots, task: Some(task) }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until at least `generation` refreshes have settled. Returns `None`
    /// if the feed stopped refreshing before that.
    pub async fn wait_for_generation(&mut self, generation: u64) -> Option<FeedSnapshot> {
        loop {
            {
                let snapshot = self.snapshots.borrow_and_update();
                if snapshot.generation >= generation {
                    return Some(snapshot.clone());
                }
            }
            if self.snapshots.changed().await.is_err() {
                let snapshot = self.snapshots.borrow();
                return (snapshot.generation >= generation).then(|| snapshot.clone());
            }
        }
    }

    /// Stop refreshing and wait until the subscription is released.
    pub async fn unmount(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        tracing::debug!("feed unmounted");
    }
}

impl Drop for FeedView {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_feed(
    client: FeedClient,
    mut subscription: Subscription,
    tx: watch::Sender<FeedSnapshot>,
) {
    let mut generation = 0;
    loop {
        tx.send_modify(|snapshot| snapshot.state = FeedState::Loading);
        let state = client.load().await;
        generation += 1;
        tx.send_replace(FeedSnapshot { state, generation });

        match subscription.next().await {
            Some(event) => tracing::debug!(record_id = %event.record_id, "refreshing feed"),
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::fixtures::record, notifier::SubmissionEvent, service::fake::FakeService};

    fn event() -> SubmissionEvent {
        SubmissionEvent { record_id: "new".to_string() }
    }

    async fn settle_scheduler() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn fetch_all_returns_newest_first() {
        let fake = Arc::new(FakeService::new());
        fake.answer_list(Ok(vec![record("a", ""), record("b", ""), record("c", "")]));
        let client = FeedClient::new(fake.clone());

        let ids: Vec<_> =
            client.fetch_all().await.expect("ok").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn load_downgrades_failures_to_empty() {
        let fake = Arc::new(FakeService::new());
        let client = FeedClient::new(fake.clone());

        fake.answer_list(Err(FetchError::Status(500)));
        assert_eq!(client.load().await, FeedState::Empty);

        fake.answer_list(Err(FetchError::Unreachable("refused".into())));
        assert_eq!(client.load().await, FeedState::Empty);

        fake.answer_list(Ok(Vec::new()));
        assert_eq!(client.load().await, FeedState::Empty);
    }

    #[test]
    fn excerpt_keeps_short_notes_and_cuts_long_ones() {
        let exact = "x".repeat(NOTES_EXCERPT_CHARS);
        assert_eq!(notes_excerpt(&exact), exact);

        let long = "y".repeat(NOTES_EXCERPT_CHARS + 1);
        let cut = notes_excerpt(&long);
        assert_eq!(cut, format!("{}...", "y".repeat(NOTES_EXCERPT_CHARS)));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let notes = "ü".repeat(NOTES_EXCERPT_CHARS);
        assert_eq!(notes_excerpt(&notes), notes);

        let notes = "ü".repeat(NOTES_EXCERPT_CHARS + 5);
        assert_eq!(notes_excerpt(&notes).chars().count(), NOTES_EXCERPT_CHARS + 3);
    }

    #[test]
    fn entry_omits_notes_block_when_empty() {
        let entry = FeedEntry::from(&record("abc", ""));
        assert_eq!(entry.heading, "New York, United States of America");
        assert_eq!(entry.date, "2025-06-01");
        assert_eq!(entry.notes_excerpt, None);
        assert_eq!(entry.id, "abc");

        let entry = FeedEntry::from(&record("abc", "fog"));
        assert_eq!(entry.notes_excerpt.as_deref(), Some("fog"));
    }

    #[tokio::test]
    async fn mount_starts_loading_then_populates() {
        let fake = Arc::new(FakeService::new());
        fake.answer_list(Ok(vec![record("a", ""), record("b", "")]));
        let notifier = SubmissionNotifier::new();

        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        assert!(feed.snapshot().state.is_loading());

        let snapshot = feed.wait_for_generation(1).await.expect("first refresh");
        let ids: Vec<_> = snapshot.state.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(fake.lists(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_settles_to_empty() {
        let fake = Arc::new(FakeService::new());
        fake.answer_list(Err(FetchError::Decode("bad".into())));
        let notifier = SubmissionNotifier::new();

        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        let snapshot = feed.wait_for_generation(1).await.expect("first refresh");

        assert_eq!(snapshot.state, FeedState::Empty);
    }

    #[tokio::test]
    async fn each_submission_triggers_exactly_one_refetch() {
        let fake = Arc::new(FakeService::new());
        let notifier = SubmissionNotifier::new();
        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        feed.wait_for_generation(1).await.expect("first refresh");

        fake.answer_list(Ok(vec![record("new", "")]));
        assert_eq!(notifier.notify(event()), 1);

        let snapshot = feed.wait_for_generation(2).await.expect("refresh after event");
        assert_eq!(snapshot.state, FeedState::Populated(vec![record("new", "")]));

        settle_scheduler().await;
        assert_eq!(fake.lists(), 2);
        assert_eq!(feed.snapshot().generation, 2);
    }

    #[tokio::test]
    async fn refresh_shows_loading_until_list_arrives() {
        let fake = Arc::new(FakeService::new());
        fake.answer_list(Ok(vec![record("a", "")]));
        let notifier = SubmissionNotifier::new();
        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        feed.wait_for_generation(1).await.expect("first refresh");

        fake.hold_lists();
        notifier.notify(event());
        settle_scheduler().await;

        let snapshot = feed.snapshot();
        assert!(snapshot.state.is_loading(), "got {:?}", snapshot.state);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(fake.lists(), 2);

        fake.release_lists();
        let snapshot = feed.wait_for_generation(2).await.expect("refresh settles");
        assert_eq!(snapshot.state, FeedState::Populated(vec![record("a", "")]));
    }

    #[tokio::test]
    async fn every_mounted_feed_refreshes_independently() {
        let fake = Arc::new(FakeService::new());
        let notifier = SubmissionNotifier::new();
        let mut left = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        let mut right = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        left.wait_for_generation(1).await.expect("left mounted");
        right.wait_for_generation(1).await.expect("right mounted");

        notifier.notify(event());
        left.wait_for_generation(2).await.expect("left refreshed");
        right.wait_for_generation(2).await.expect("right refreshed");

        settle_scheduler().await;
        assert_eq!(fake.lists(), 4);
    }

    #[tokio::test]
    async fn unmount_releases_subscription() {
        let fake = Arc::new(FakeService::new());
        let notifier = SubmissionNotifier::new();
        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        feed.wait_for_generation(1).await.expect("mounted");
        assert_eq!(notifier.subscriber_count(), 1);

        feed.unmount().await;
        assert_eq!(notifier.subscriber_count(), 0);

        assert_eq!(notifier.notify(event()), 0);
        settle_scheduler().await;
        assert_eq!(fake.lists(), 1);
    }

    #[tokio::test]
    async fn panicking_owner_still_releases_subscription() {
        let fake = Arc::new(FakeService::new());
        let notifier = SubmissionNotifier::new();

        let client = FeedClient::new(fake.clone());
        let owner_notifier = notifier.clone();
        let owner = tokio::spawn(async move {
            let _feed = FeedView::mount(client, &owner_notifier);
            panic!("region crashed");
        });
        assert!(owner.await.is_err());

        settle_scheduler().await;
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn feed_keeps_last_state_when_notifier_is_gone() {
        let fake = Arc::new(FakeService::new());
        fake.answer_list(Ok(vec![record("a", "")]));
        let notifier = SubmissionNotifier::new();
        let mut feed = FeedView::mount(FeedClient::new(fake.clone()), &notifier);
        feed.wait_for_generation(1).await.expect("mounted");

        drop(notifier);
        assert!(feed.wait_for_generation(2).await.is_none());
        assert_eq!(feed.snapshot().state, FeedState::Populated(vec![record("a", "")]));
    }
}

use std::sync::Arc;

use crate::{
    config::ServiceSettings,
    error::ConfigError,
    feed::{FeedClient, FeedView},
    lookup::LookupClient,
    notifier::SubmissionNotifier,
    service::{HttpWeatherService, WeatherService},
    submit::SubmitClient,
};

/// Application root: owns the submission notifier and hands each region the
/// clients it needs. Regions never share state with each other.
#[derive(Debug, Clone)]
pub struct WeatherApp {
    service: Arc<dyn WeatherService>,
    notifier: SubmissionNotifier,
}

impl WeatherApp {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service, notifier: SubmissionNotifier::new() }
    }

    /// Build the app against the HTTP service described by `settings`.
    pub fn connect(settings: &ServiceSettings) -> Result<Self, ConfigError> {
        let service = HttpWeatherService::new(settings)?;
        tracing::debug!(base_url = %service.base_url(), "weather service configured");
        Ok(Self::new(Arc::new(service)))
    }

    pub fn notifier(&self) -> &SubmissionNotifier {
        &self.notifier
    }

    pub fn lookup_client(&self) -> LookupClient {
        LookupClient::new(self.service.clone())
    }

    pub fn feed_client(&self) -> FeedClient {
        FeedClient::new(self.service.clone())
    }

    pub fn submit_client(&self) -> SubmitClient {
        SubmitClient::new(self.service.clone(), self.notifier.clone())
    }

    /// Mount a feed subscribed to this app's submissions.
    pub fn mount_feed(&self) -> FeedView {
        FeedView::mount(self.feed_client(), &self.notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feed::FeedState,
        lookup::{LookupPanel, LookupTrigger},
        model::fixtures::record,
        service::fake::FakeService,
        submit::SubmissionForm,
    };
    use std::time::Duration;

    #[test]
    fn connect_uses_settings() {
        let settings =
            ServiceSettings::new("http://localhost:9999", Duration::from_secs(1)).expect("valid");
        assert!(WeatherApp::connect(&settings).is_ok());
    }

    #[tokio::test]
    async fn submit_refreshes_mounted_feed() {
        let fake = Arc::new(FakeService::new());
        let app = WeatherApp::new(fake.clone());

        let mut feed = app.mount_feed();
        let first = feed.wait_for_generation(1).await.expect("mounted");
        assert_eq!(first.state, FeedState::Empty);

        fake.answer_list(Ok(vec![record("new-id", "")]));
        let receipt =
            app.submit_client().submit(&SubmissionForm::new("Oslo")).await.expect("accepted");
        assert_eq!(receipt.id, "new-id");

        let refreshed = feed.wait_for_generation(2).await.expect("refreshed");
        assert_eq!(refreshed.state.entries()[0].id, "new-id");
    }

    #[tokio::test]
    async fn lookup_does_not_touch_the_feed() {
        let fake = Arc::new(FakeService::new());
        fake.answer_lookup(Ok(record("abc", "")));
        let app = WeatherApp::new(fake.clone());

        let mut feed = app.mount_feed();
        feed.wait_for_generation(1).await.expect("mounted");

        let mut panel = LookupPanel::new();
        panel.set_input("abc");
        assert!(panel.trigger(LookupTrigger::Button, &app.lookup_client()).await);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(fake.lists(), 1);
        assert_eq!(feed.snapshot().generation, 1);
    }
}

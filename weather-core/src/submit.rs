use std::sync::Arc;

use chrono::Local;

use crate::{
    error::SubmitError,
    model::{NewSubmission, SubmissionReceipt},
    notifier::{SubmissionEvent, SubmissionNotifier},
    service::WeatherService,
};

/// Fields of the submit form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    pub date: String,
    pub location: String,
    pub notes: String,
}

impl SubmissionForm {
    /// A form for `location` dated today, without notes.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            date: Local::now().format("%Y-%m-%d").to_string(),
            location: location.into(),
            notes: String::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    fn validate(&self) -> Result<NewSubmission, SubmitError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(SubmitError::MissingLocation);
        }
        let date = self.date.trim();
        if date.is_empty() {
            return Err(SubmitError::MissingDate);
        }

        Ok(NewSubmission {
            date: date.to_string(),
            location: location.to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Stores new observations and tells the rest of the app about them.
#[derive(Debug, Clone)]
pub struct SubmitClient {
    service: Arc<dyn WeatherService>,
    notifier: SubmissionNotifier,
}

impl SubmitClient {
    pub fn new(service: Arc<dyn WeatherService>, notifier: SubmissionNotifier) -> Self {
        Self { service, notifier }
    }

    /// Validate and send `form`. On success every subscriber is signalled;
    /// this does not wait for them to act.
    pub async fn submit(&self, form: &SubmissionForm) -> Result<SubmissionReceipt, SubmitError> {
        let submission = form.validate()?;
        let receipt = self.service.create_record(&submission).await?;

        tracing::info!(id = %receipt.id, location = %submission.location, "observation submitted");
        self.notifier.notify(SubmissionEvent { record_id: receipt.id.clone() });

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fake::FakeService;

    #[test]
    fn new_form_is_dated_today() {
        let form = SubmissionForm::new("Oslo");
        assert!(chrono::NaiveDate::parse_from_str(&form.date, "%Y-%m-%d").is_ok());
        assert!(form.notes.is_empty());
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_sending() {
        let fake = Arc::new(FakeService::new());
        let client = SubmitClient::new(fake.clone(), SubmissionNotifier::new());

        let err = client.submit(&SubmissionForm::new("  ")).await.unwrap_err();
        assert_eq!(err, SubmitError::MissingLocation);

        let err = client.submit(&SubmissionForm::new("Oslo").with_date("")).await.unwrap_err();
        assert_eq!(err, SubmitError::MissingDate);

        assert_eq!(fake.creates(), 0);
    }

    #[tokio::test]
    async fn success_notifies_subscribers() {
        let fake = Arc::new(FakeService::new());
        fake.answer_create(Ok(SubmissionReceipt { id: "r1".into() }));
        let notifier = SubmissionNotifier::new();
        let mut sub = notifier.subscribe();
        let client = SubmitClient::new(fake.clone(), notifier);

        let receipt = client
            .submit(&SubmissionForm::new("Oslo").with_notes("cold"))
            .await
            .expect("accepted");

        assert_eq!(receipt.id, "r1");
        assert_eq!(sub.next().await, Some(SubmissionEvent { record_id: "r1".into() }));
    }

    #[tokio::test]
    async fn failure_does_not_notify() {
        let fake = Arc::new(FakeService::new());
        fake.answer_create(Err(SubmitError::Rejected { status: 500, detail: "no key".into() }));
        let notifier = SubmissionNotifier::new();
        let sub_probe = notifier.clone();
        let mut sub = sub_probe.subscribe();
        let client = SubmitClient::new(fake.clone(), notifier);

        let err = client.submit(&SubmissionForm::new("Oslo")).await.unwrap_err();
        assert_eq!(err.user_message(), "no key");

        drop(client);
        drop(sub_probe);
        assert_eq!(sub.next().await, None);
    }
}

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{FetchError, LookupError, SubmitError},
    model::{NewSubmission, SubmissionReceipt, WeatherRecord},
};

pub mod http;

pub use http::HttpWeatherService;

/// The remote records service, as seen by the client.
///
/// Implementations classify transport and status failures into the typed
/// errors; callers never look at HTTP details.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// `GET /weather/{id}`. `id` is expected to be trimmed and non-empty.
    async fn get_record(&self, id: &str) -> Result<WeatherRecord, LookupError>;

    /// `GET /weather_records`, in the order the service returns them.
    async fn list_records(&self) -> Result<Vec<WeatherRecord>, FetchError>;

    /// `POST /weather`.
    async fn create_record(
        &self,
        submission: &NewSubmission,
    ) -> Result<SubmissionReceipt, SubmitError>;
}

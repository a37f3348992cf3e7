use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};

use crate::{
    config::ServiceSettings,
    error::{ConfigError, FetchError, LookupError, SubmitError, error_detail},
    model::{NewSubmission, SubmissionReceipt, WeatherRecord},
};

use super::WeatherService;

/// `WeatherService` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpWeatherService {
    base_url: Url,
    http: Client,
}

impl HttpWeatherService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { base_url: settings.base_url.clone(), http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are validated to be hierarchical, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl WeatherService for HttpWeatherService {
    async fn get_record(&self, id: &str) -> Result<WeatherRecord, LookupError> {
        // URL parsing collapses dot segments (encoded or not), so these can
        // never reach `/weather/{id}`.
        if is_dot_segment(id) {
            return Err(LookupError::InvalidFormat);
        }
        let url = self.endpoint(&["weather", id]);
        tracing::debug!(%url, "fetching weather record");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Unreachable(e.to_string()))?;

        match res.status() {
            status if status.is_success() => {
                let body =
                    res.text().await.map_err(|e| LookupError::Unreachable(e.to_string()))?;
                serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(LookupError::NotFound),
            StatusCode::BAD_REQUEST => Err(LookupError::InvalidFormat),
            status => {
                let (status, detail) = failure_detail(status, res).await;
                Err(LookupError::Server { status, detail })
            }
        }
    }

    async fn list_records(&self) -> Result<Vec<WeatherRecord>, FetchError> {
        let url = self.endpoint(&["weather_records"]);
        tracing::debug!(%url, "fetching weather records");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let (status, detail) = failure_detail(status, res).await;
            tracing::debug!(status, %detail, "weather records request failed");
            return Err(FetchError::Status(status));
        }

        let body = res.text().await.map_err(|e| FetchError::Unreachable(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn create_record(
        &self,
        submission: &NewSubmission,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let url = self.endpoint(&["weather"]);
        tracing::debug!(%url, location = %submission.location, "submitting observation");

        let res = self
            .http
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmitError::Unreachable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let (status, detail) = failure_detail(status, res).await;
            return Err(SubmitError::Rejected { status, detail });
        }

        let body = res.text().await.map_err(|e| SubmitError::Unreachable(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| SubmitError::Decode(e.to_string()))
    }
}

/// Status code and display detail of a failed response. An unreadable body
/// yields the generic message.
async fn failure_detail(status: StatusCode, res: Response) -> (u16, String) {
    let code = status.as_u16();
    let body = res.text().await.unwrap_or_default();
    tracing::debug!(status = code, body = %truncate_body(&body), "error response");
    (code, error_detail(code, &body))
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

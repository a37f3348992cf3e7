//! Error types for the records client.
//!
//! Variants carry owned strings instead of transport errors so they can be
//! cloned into view state and compared in tests.

use thiserror::Error;

/// Why a single-record lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no weather ID given")]
    EmptyInput,

    #[error("could not decode weather record: {0}")]
    Decode(String),

    #[error("weather record not found")]
    NotFound,

    #[error("weather ID is not well-formed")]
    InvalidFormat,

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("service unreachable: {0}")]
    Unreachable(String),
}

impl LookupError {
    /// Short text shown next to the lookup input.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "Please enter a weather ID".to_string(),
            Self::Decode(_) => "The server sent a weather record we couldn't read".to_string(),
            Self::NotFound => "Couldn't find weather data for that ID".to_string(),
            Self::InvalidFormat => "Invalid weather ID format".to_string(),
            Self::Server { detail, .. } => detail.clone(),
            Self::Unreachable(_) => "Can't reach the server right now".to_string(),
        }
    }
}

/// Why the submissions list could not be fetched. Never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("could not decode weather records: {0}")]
    Decode(String),
}

/// Why a new observation was not stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("location is required")]
    MissingLocation,

    #[error("date is required")]
    MissingDate,

    #[error("submission rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("could not decode submission receipt: {0}")]
    Decode(String),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingLocation => "Please enter a location".to_string(),
            Self::MissingDate => "Please enter a date".to_string(),
            Self::Rejected { detail, .. } => detail.clone(),
            Self::Unreachable(_) => "Can't reach the server right now".to_string(),
            Self::Decode(_) => "The server accepted the submission but its reply was unreadable"
                .to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Text for a non-2xx response: the body's `detail` string when there is one,
/// otherwise a generic message naming the status.
pub(crate) fn error_detail(status: u16, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: Option<serde_json::Value>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.as_str().map(str::to_owned))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Server error ({status})"))
}

//! Core library for the `weather-records` client.
//!
//! This crate defines:
//! - The record schema exchanged with the weather records service
//! - A service abstraction with an HTTP implementation
//! - The lookup, feed and submit regions, and the notifier that keeps the
//!   feed in step with submissions
//! - Configuration handling
//!
//! It is used by the `weather-records` binary, but any front end can drive the
//! same view models.

pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod lookup;
pub mod model;
pub mod notifier;
pub mod service;
pub mod submit;

pub use app::WeatherApp;
pub use config::{Config, ServiceSettings};
pub use error::{ConfigError, FetchError, LookupError, SubmitError};
pub use feed::{FeedClient, FeedEntry, FeedSnapshot, FeedState, FeedView};
pub use lookup::{LookupClient, LookupPanel, LookupStatus, LookupTrigger, RecordDetail};
pub use model::{NewSubmission, SubmissionReceipt, WeatherRecord};
pub use notifier::{SubmissionEvent, SubmissionNotifier, Subscription};
pub use service::{HttpWeatherService, WeatherService};
pub use submit::{SubmissionForm, SubmitClient};

//! Single-record lookup: the client call and the panel that drives it.
//!
//! Lookups are serialized per panel. [`LookupPanel::begin`] hands out one
//! [`LookupTicket`]; until it is settled every trigger is ignored. Tickets
//! carry a process-wide sequence number, so a panel only accepts the ticket
//! it issued last.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{error::LookupError, model::WeatherRecord, service::WeatherService};

#[derive(Debug, Clone)]
pub struct LookupClient {
    service: Arc<dyn WeatherService>,
}

impl LookupClient {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self { service }
    }

    /// Fetch one record. Blank input fails with `EmptyInput` before any
    /// network call. Nothing is cached.
    pub async fn lookup(&self, id: &str) -> Result<WeatherRecord, LookupError> {
        let id = normalize_id(id)?;
        self.service.get_record(id).await
    }
}

pub fn normalize_id(raw: &str) -> Result<&str, LookupError> {
    let id = raw.trim();
    if id.is_empty() { Err(LookupError::EmptyInput) } else { Ok(id) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTrigger {
    Button,
    EnterKey,
}

impl LookupTrigger {
    /// Only Enter triggers a lookup from the keyboard.
    pub fn from_key(key: &str) -> Option<Self> {
        (key == "Enter").then_some(Self::EnterKey)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Idle,
    InFlight,
    Success,
    Failed,
}

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Proof that a lookup was started. Settling consumes it.
#[derive(Debug)]
#[must_use = "an unsettled ticket leaves the panel in flight"]
pub struct LookupTicket {
    id: String,
    seq: u64,
}

impl LookupTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// State of the lookup region.
#[derive(Debug, Default)]
pub struct LookupPanel {
    input: String,
    /// Sequence of the outstanding ticket.
    pending: Option<u64>,
    record: Option<WeatherRecord>,
    error: Option<LookupError>,
}

impl LookupPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        self.record.as_ref()
    }

    pub fn error(&self) -> Option<&LookupError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> LookupStatus {
        if self.in_flight() {
            LookupStatus::InFlight
        } else if self.error.is_some() {
            LookupStatus::Failed
        } else if self.record.is_some() {
            LookupStatus::Success
        } else {
            LookupStatus::Idle
        }
    }

    /// Whether the button and the Enter key are live.
    pub fn can_trigger(&self) -> bool {
        !self.in_flight()
    }

    fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the input text. Clears a displayed error, keeps a displayed
    /// record. Ignored (returns `false`) while a lookup is in flight.
    pub fn set_input(&mut self, value: impl Into<String>) -> bool {
        if self.in_flight() {
            return false;
        }
        self.input = value.into();
        self.error = None;
        true
    }

    /// Start a lookup from the current input.
    ///
    /// Returns `None` when the trigger is disabled or the input is blank; the
    /// latter records `EmptyInput` without touching the displayed record.
    pub fn begin(&mut self, trigger: LookupTrigger) -> Option<LookupTicket> {
        if self.in_flight() {
            tracing::debug!(?trigger, "lookup already in flight, trigger ignored");
            return None;
        }

        let id = match normalize_id(&self.input) {
            Ok(id) => id.to_string(),
            Err(err) => {
                self.error = Some(err);
                return None;
            }
        };

        let seq = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(seq);
        self.error = None;
        self.record = None;
        Some(LookupTicket { id, seq })
    }

    /// Apply the outcome of the lookup `ticket` was issued for.
    ///
    /// Returns `false`, leaving the panel untouched, when `ticket` is not the
    /// one this panel is waiting on.
    pub fn settle(
        &mut self,
        ticket: LookupTicket,
        result: Result<WeatherRecord, LookupError>,
    ) -> bool {
        if self.pending != Some(ticket.seq) {
            tracing::debug!(id = ticket.id(), "ticket not issued by this panel, ignored");
            return false;
        }
        self.pending = None;
        match result {
            Ok(record) => self.record = Some(record),
            Err(err) => {
                tracing::debug!(id = ticket.id(), error = %err, "lookup failed");
                self.error = Some(err);
            }
        }
        true
    }

    /// Begin, call the service, settle. Returns `false` when the trigger was
    /// not accepted.
    pub async fn trigger(&mut self, trigger: LookupTrigger, client: &LookupClient) -> bool {
        let Some(ticket) = self.begin(trigger) else {
            return false;
        };
        let result = client.lookup(ticket.id()).await;
        self.settle(ticket, result)
    }

    /// Key handler for the input field.
    pub async fn key_pressed(&mut self, key: &str, client: &LookupClient) -> bool {
        match LookupTrigger::from_key(key) {
            Some(trigger) => self.trigger(trigger, client).await,
            None => false,
        }
    }
}

/// Display lines for a looked-up record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDetail {
    pub heading: String,
    pub date: String,
    pub temperature: String,
    pub conditions: String,
    pub humidity: String,
    pub wind: String,
    pub notes: Option<String>,
    pub id: String,
}

impl From<&WeatherRecord> for RecordDetail {
    fn from(record: &WeatherRecord) -> Self {
        let current = &record.weather_data.current;
        Self {
            heading: record.place(),
            date: record.date.clone(),
            temperature: format!("{}°C", current.temperature),
            conditions: current.summary(),
            humidity: format!("{}%", current.humidity),
            wind: format!("{} km/h", current.wind_speed),
            notes: (!record.notes.trim().is_empty()).then(|| record.notes.clone()),
            id: record.id.clone(),
        }
    }
}

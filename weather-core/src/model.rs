use serde::{Deserialize, Deserializer, Serialize};

/// A stored weather observation as returned by the records service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: String,
    pub date: String,
    /// Label the submitter typed; may differ from `weather_data.location.name`.
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    pub weather_data: WeatherSnapshot,
}

impl WeatherRecord {
    /// Notes, or `None` when the record has none.
    pub fn notes(&self) -> Option<&str> {
        if self.notes.is_empty() { None } else { Some(self.notes.as_str()) }
    }

    /// "name, country" of the resolved location.
    pub fn place(&self) -> String {
        let loc = &self.weather_data.location;
        format!("{}, {}", loc.name, loc.country)
    }
}

/// Weather snapshot captured by the service when the record was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub location: ResolvedLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees Celsius.
    pub temperature: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weather_descriptions: Vec<String>,
    /// Percent.
    pub humidity: f64,
    /// km/h.
    pub wind_speed: f64,
}

impl CurrentConditions {
    pub fn summary(&self) -> String {
        if self.weather_descriptions.is_empty() {
            "Unknown".to_string()
        } else {
            self.weather_descriptions.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub country: String,
}

/// Body of a record creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubmission {
    pub date: String,
    pub location: String,
    pub notes: String,
}

/// What the service answers after creating a record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionReceipt {
    pub id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

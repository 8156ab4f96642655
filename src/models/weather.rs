use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::cache::Keyed;

/// Latest observation from one weather sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub id: String,
    pub location: Option<Position>,
    pub date_observed: Option<DateTime<Utc>>,
    /// °C, one decimal.
    pub temperature: Option<f64>,
}

impl Keyed for WeatherObservation {
    fn key(&self) -> &str {
        &self.id
    }
}

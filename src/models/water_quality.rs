use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::cache::Keyed;

/// One water quality observation (temperature in °C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterQuality {
    pub id: String,
    pub temperature: f64,
    pub date_observed: DateTime<Utc>,
    pub location: Option<Position>,
    pub source: Option<String>,
}

impl Keyed for WaterQuality {
    fn key(&self) -> &str {
        &self.id
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::cache::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    pub id: String,
    pub location: Option<Position>,
    pub date_observed: Option<DateTime<Utc>>,
    pub pollutants: Vec<Pollutant>,
}

/// One measured quantity, named as upstream names it (`no2`, `pm10`, `temperature`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pollutant {
    pub name: String,
    pub value: f64,
}

impl AirQuality {
    pub fn pollutant(&self, name: &str) -> Option<f64> {
        self.pollutants
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }
}

impl Keyed for AirQuality {
    fn key(&self) -> &str {
        &self.id
    }
}

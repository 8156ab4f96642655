use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Geometry;
use crate::cache::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTrail {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub categories: Vec<String>,
    /// Kilometres, two decimals.
    pub length: Option<f64>,
    pub difficulty: Option<f64>,
    pub status: Option<String>,
    pub payment_required: bool,
    pub date_last_preparation: Option<DateTime<Utc>>,
    pub area_served: Option<String>,
    pub see_also: Vec<String>,
    pub location: Option<Geometry>,
}

impl Keyed for ExerciseTrail {
    fn key(&self) -> &str {
        &self.id
    }
}

// Beach with its boundary centroid and the latest nearby water temperature

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Geometry, Position};
use crate::cache::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beach {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Centroid of the boundary.
    pub location: Option<Position>,
    pub boundary: Option<Geometry>,
    #[serde(default)]
    pub see_also: Vec<String>,
    pub water_quality: Option<BeachWaterQuality>,
}

/// Most recent water temperature observed near a beach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeachWaterQuality {
    pub temperature: f64,
    pub date_observed: DateTime<Utc>,
    pub source: Option<String>,
}

impl Keyed for Beach {
    fn key(&self) -> &str {
        &self.id
    }
}

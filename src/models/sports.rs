// Sports fields and sports venues

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Geometry, Position};
use crate::cache::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsField {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub categories: Vec<String>,
    pub public_access: Option<String>,
    pub location: Option<Position>,
    pub boundary: Option<Geometry>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub date_last_preparation: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub see_also: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsVenue {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub categories: Vec<String>,
    pub location: Option<Position>,
    pub boundary: Option<Geometry>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub managed_by: Option<String>,
    pub source: Option<String>,
    pub see_also: Vec<String>,
}

impl Keyed for SportsField {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for SportsVenue {
    fn key(&self) -> &str {
        &self.id
    }
}

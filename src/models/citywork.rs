use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::cache::Keyed;

/// Ongoing or planned work in public space (road works, excavations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWork {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub location: Option<Position>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
}

impl Keyed for CityWork {
    fn key(&self) -> &str {
        &self.id
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::cache::Keyed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadAccident {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub location: Option<Position>,
    pub accident_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
}

impl Keyed for RoadAccident {
    fn key(&self) -> &str {
        &self.id
    }
}

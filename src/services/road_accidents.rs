use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{Geometry, RoadAccident, lenient_datetime, lenient_geometry};

pub const ENTITY_TYPE: &str = "RoadAccident";
pub const KIND: &str = "road accident";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoadAccident {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    accident_date: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_modified: Option<DateTime<Utc>>,
}

fn transform(raw: RawRoadAccident) -> Option<RoadAccident> {
    Some(RoadAccident {
        id: raw.id,
        description: raw.description.unwrap_or_default(),
        location: raw.location.as_ref().and_then(Geometry::centroid),
        accident_date: raw.accident_date,
        status: raw.status,
        date_created: raw.date_created,
        date_modified: raw.date_modified,
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<RoadAccident> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

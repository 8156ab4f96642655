use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{CityWork, Geometry, lenient_datetime, lenient_geometry};

pub const ENTITY_TYPE: &str = "CityWork";
pub const KIND: &str = "city work";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCityWork {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_modified: Option<DateTime<Utc>>,
}

fn transform(raw: RawCityWork) -> Option<CityWork> {
    Some(CityWork {
        id: raw.id,
        description: raw.description.unwrap_or_default(),
        location: raw.location.as_ref().and_then(Geometry::centroid),
        start_date: raw.start_date,
        end_date: raw.end_date,
        date_created: raw.date_created,
        date_modified: raw.date_modified,
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<CityWork> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

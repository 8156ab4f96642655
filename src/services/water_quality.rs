// Water quality observations (temperature in °C). Also the lookup source for beaches.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{Geometry, WaterQuality, lenient_datetime, lenient_geometry, round_to};

pub const ENTITY_TYPE: &str = "WaterQualityObserved";
pub const KIND: &str = "water quality observation";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawWaterQuality {
    id: String,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_observed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default)]
    source: Option<String>,
}

/// Observations without a temperature or an observation time carry nothing to serve.
pub(crate) fn transform(raw: RawWaterQuality) -> Option<WaterQuality> {
    Some(WaterQuality {
        temperature: round_to(raw.temperature?, 1),
        date_observed: raw.date_observed?,
        location: raw.location.as_ref().and_then(Geometry::centroid),
        id: raw.id,
        source: raw.source,
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<WaterQuality> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

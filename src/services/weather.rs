use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{Geometry, WeatherObservation, lenient_datetime, lenient_geometry, round_to};

pub const ENTITY_TYPE: &str = "WeatherObserved";
pub const KIND: &str = "weather observation";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWeatherObserved {
    id: String,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_observed: Option<DateTime<Utc>>,
    #[serde(default)]
    temperature: Option<f64>,
}

fn transform(raw: RawWeatherObserved) -> Option<WeatherObservation> {
    Some(WeatherObservation {
        id: raw.id,
        location: raw.location.as_ref().and_then(Geometry::centroid),
        date_observed: raw.date_observed,
        temperature: raw.temperature.map(|t| round_to(t, 1)),
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<WeatherObservation> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

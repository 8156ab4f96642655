// Air quality observations: known pollutant attributes are lifted into a list.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{AirQuality, Geometry, Pollutant, lenient_datetime, lenient_geometry};

pub const ENTITY_TYPE: &str = "AirQualityObserved";
pub const KIND: &str = "air quality observation";

/// Attributes reported as pollutants, in output order.
pub const POLLUTANTS: &[&str] = &[
    "co", "co2", "no", "no2", "nox", "o3", "so2", "pm1", "pm10", "pm25", "temperature",
    "relativeHumidity", "atmosphericPressure", "windSpeed", "windDirection",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAirQuality {
    id: String,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_observed: Option<DateTime<Utc>>,
    #[serde(flatten)]
    attributes: HashMap<String, Value>,
}

/// Picks the numeric pollutant attributes, skipping anything non-numeric.
pub fn pollutants(attributes: &HashMap<String, Value>) -> Vec<Pollutant> {
    POLLUTANTS
        .iter()
        .filter_map(|name| {
            let value = attributes.get(*name)?.as_f64()?;
            Some(Pollutant {
                name: (*name).to_owned(),
                value,
            })
        })
        .collect()
}

fn transform(raw: RawAirQuality) -> Option<AirQuality> {
    Some(AirQuality {
        pollutants: pollutants(&raw.attributes),
        id: raw.id,
        location: raw.location.as_ref().and_then(Geometry::centroid),
        date_observed: raw.date_observed,
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<AirQuality> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pollutants_keep_known_numeric_attributes_in_order() {
        let attrs: HashMap<String, Value> = serde_json::from_value(json!({
            "pm10": 12.0,
            "no2": 20.5,
            "type": "AirQualityObserved",
            "pm25": "n/a",
            "reliability": 0.9
        }))
        .unwrap();
        let p = pollutants(&attrs);
        let names: Vec<&str> = p.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["no2", "pm10"]);
    }
}

// Air temperature series: queried per request from the broker's temporal API and
// run through the windowed aggregator. Not cached.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::BrokerContext;
use crate::aggregation::{Aggregation, AggregationRequest, aggregate};
use crate::broker::SourceError;

pub const SENSOR_ENTITY_TYPE: &str = "WeatherObserved";
pub const TEMPERATURE_ATTRIBUTE: &str = "temperature";
const URN_PREFIX: &str = "urn:ngsi-ld:";

/// Accepts a full entity id or a bare sensor id (`se:servanet:lora:sn-elt-livboj-01`).
pub fn sensor_entity_id(sensor: &str) -> String {
    if sensor.starts_with(URN_PREFIX) {
        sensor.to_owned()
    } else {
        format!("{URN_PREFIX}{SENSOR_ENTITY_TYPE}:{sensor}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSeries {
    pub sensor: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub values: Aggregation,
}

pub async fn air_temperature(
    ctx: &BrokerContext,
    sensor: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    request: &AggregationRequest,
) -> Result<TemperatureSeries, SourceError> {
    let entity_id = sensor_entity_id(sensor);
    let samples = ctx
        .source
        .query_temporal(&ctx.tenant, &entity_id, TEMPERATURE_ATTRIBUTE, from, to)
        .await?;
    let values = aggregate(&samples, request);
    debug!(
        sensor = %entity_id,
        samples = samples.len(),
        results = values.len(),
        "temperature series aggregated"
    );
    Ok(TemperatureSeries {
        sensor: entity_id,
        from,
        to,
        values,
    })
}

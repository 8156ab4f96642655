// GET /api/temperature/air: aggregated temperature series for one sensor

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::aggregation::AggregationRequest;
use crate::services::temperature::{TemperatureSeries, air_temperature};

/// Hours looked back when `timeAt` is not given.
const DEFAULT_RANGE_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TemperatureQuery {
    sensor: Option<String>,
    time_at: Option<String>,
    end_time_at: Option<String>,
    aggr_period_duration: Option<String>,
    aggr_methods: Option<String>,
}

fn parse_time(name: &'static str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| ApiError::InvalidParameter {
                    name,
                    reason: e.to_string(),
                })
        })
        .transpose()
}

pub(super) async fn air_temperature_handler(
    State(state): State<AppState>,
    Query(query): Query<TemperatureQuery>,
) -> Result<Json<TemperatureSeries>, ApiError> {
    let sensor = query
        .sensor
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingParameter("sensor"))?;

    let end = parse_time("endTimeAt", query.end_time_at.as_deref())?.unwrap_or_else(Utc::now);
    let start = parse_time("timeAt", query.time_at.as_deref())?;
    if let Some(start) = start
        && start > end
    {
        return Err(ApiError::InvalidParameter {
            name: "timeAt",
            reason: "must not be after endTimeAt".into(),
        });
    }

    let request = AggregationRequest::parse(
        query.aggr_period_duration.as_deref(),
        query.aggr_methods.as_deref(),
        start,
    )?;
    let from = start.unwrap_or(end - TimeDelta::hours(DEFAULT_RANGE_HOURS));
    let series = air_temperature(&state.broker, sensor, from, end, &request).await?;
    Ok(Json(series))
}

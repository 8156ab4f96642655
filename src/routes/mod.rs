// HTTP routes

mod datasets;
mod error;
mod http;
mod temperature;

pub use error::ApiError;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::{BrokerContext, Datasets};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) datasets: Arc<Datasets>,
    pub(crate) broker: BrokerContext,
}

pub fn app(datasets: Arc<Datasets>, broker: BrokerContext) -> Router {
    let state = AppState {
        datasets: datasets.clone(),
        broker,
    };
    Router::new()
        .route("/", get(|| async { "opendata-gateway" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/status", get(http::status_handler)) // GET /api/status
        .route("/api/temperature/air", get(temperature::air_temperature_handler)) // GET /api/temperature/air
        .with_state(state)
        .merge(datasets::router("/api/beaches", datasets.beaches.clone()))
        .merge(datasets::router("/api/exercisetrails", datasets.exercise_trails.clone()))
        .merge(datasets::router("/api/sportsfields", datasets.sports_fields.clone()))
        .merge(datasets::router("/api/sportsvenues", datasets.sports_venues.clone()))
        .merge(datasets::router("/api/roadaccidents", datasets.road_accidents.clone()))
        .merge(datasets::router("/api/cityworks", datasets.cityworks.clone()))
        .merge(datasets::router("/api/airquality", datasets.air_quality.clone()))
        .merge(datasets::router("/api/waterqualities", datasets.water_quality.clone()))
        .merge(datasets::router("/api/weather", datasets.weather.clone()))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
}

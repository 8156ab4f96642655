// Integration tests: HTTP endpoints over in-memory datasets

mod common;

use axum_test::TestServer;
use common::{FakeSource, TEST_CONFIG, broker_context, refreshed, ts};
use opendata_gateway::config::AppConfig;
use opendata_gateway::models::TimeSeriesSample;
use opendata_gateway::routes;
use opendata_gateway::services::{Datasets, beaches, trails};
use serde_json::{Value, json};
use std::sync::Arc;

fn test_source() -> Arc<FakeSource> {
    Arc::new(
        FakeSource::new()
            .with_entities(
                beaches::ENTITY_TYPE,
                vec![json!({
                    "id": "urn:ngsi-ld:Beach:1",
                    "name": "Stranden",
                    "location": {"type": "Point", "coordinates": [17.3, 62.4]}
                })],
            )
            .with_entities(
                trails::ENTITY_TYPE,
                vec![json!({
                    "id": "urn:ngsi-ld:ExerciseTrail:1",
                    "name": "Motionsspår",
                    "category": "running"
                })],
            )
            .with_temporal(
                "urn:ngsi-ld:WeatherObserved:sensor-1",
                vec![
                    TimeSeriesSample::new(ts("2021-09-01T12:00:00Z"), 1.0),
                    TimeSeriesSample::new(ts("2021-09-01T12:20:00Z"), 2.0),
                    TimeSeriesSample::new(ts("2021-09-01T12:40:00Z"), 3.0),
                    TimeSeriesSample::new(ts("2021-09-01T13:00:00Z"), 4.0),
                    TimeSeriesSample::new(ts("2021-09-01T13:20:00Z"), 5.23),
                ],
            ),
    )
}

fn test_app(source: Arc<FakeSource>) -> (axum::Router, Arc<Datasets>) {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let ctx = broker_context(source);
    let datasets = Arc::new(Datasets::new(&ctx, &config));
    (routes::app(datasets.clone(), ctx), datasets)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("opendata-gateway");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("opendata-gateway")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_lists_are_empty_before_first_refresh() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();
    for route in [
        "/api/beaches",
        "/api/exercisetrails",
        "/api/sportsfields",
        "/api/sportsvenues",
        "/api/roadaccidents",
        "/api/cityworks",
        "/api/airquality",
        "/api/waterqualities",
        "/api/weather",
    ] {
        let response = server.get(route).await;
        response.assert_status_ok();
        response.assert_json(&json!([]));
    }
}

#[tokio::test]
async fn test_list_and_detail_after_refresh() {
    let (app, datasets) = test_app(test_source());
    datasets.start_all();
    refreshed(&datasets.beaches).await;
    refreshed(&datasets.exercise_trails).await;
    let server = TestServer::new(app).unwrap();

    let list: Value = server.get("/api/beaches").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], "urn:ngsi-ld:Beach:1");
    assert_eq!(list[0]["location"], json!([17.3, 62.4]));

    let response = server.get("/api/beaches/urn:ngsi-ld:Beach:1").await;
    response.assert_status_ok();
    let beach: Value = response.json();
    assert_eq!(beach["name"], "Stranden");

    let trail: Value = server
        .get("/api/exercisetrails/urn:ngsi-ld:ExerciseTrail:1")
        .await
        .json();
    assert_eq!(trail["categories"], json!(["running"]));

    datasets.shutdown_all().await;
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (app, datasets) = test_app(test_source());
    datasets.start_all();
    refreshed(&datasets.beaches).await;
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/beaches/urn:ngsi-ld:Beach:missing").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "no such beach: urn:ngsi-ld:Beach:missing");

    datasets.shutdown_all().await;
}

#[tokio::test]
async fn test_status_endpoint_reports_every_dataset() {
    let source = test_source();
    source.fail_type(trails::ENTITY_TYPE);
    let (app, datasets) = test_app(source);
    datasets.start_all();
    refreshed(&datasets.beaches).await;
    refreshed(&datasets.exercise_trails).await;
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/status").await;
    response.assert_status_ok();
    let status: Value = response.json();
    assert_eq!(status.as_object().unwrap().len(), 9);
    assert_eq!(status["beaches"]["count"], 1);
    assert_eq!(status["beaches"]["running"], true);
    assert!(status["beaches"]["lastSuccessAt"].is_string());
    assert!(status["exercisetrails"]["lastSuccessAt"].is_null());
    assert!(status["exercisetrails"]["lastError"].is_string());
    assert_eq!(status["exercisetrails"]["consecutiveFailures"], 1);

    datasets.shutdown_all().await;
}

#[tokio::test]
async fn test_temperature_windows() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();

    let response = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .add_query_param("timeAt", "2021-09-01T12:00:00Z")
        .add_query_param("endTimeAt", "2021-09-01T14:00:00Z")
        .add_query_param("aggrPeriodDuration", "PT1H")
        .add_query_param("aggrMethods", "avg,max")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["sensor"], "urn:ngsi-ld:WeatherObserved:sensor-1");
    let values = body["values"].as_array().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["average"], 2.0);
    assert_eq!(values[1]["average"], 4.6);
    assert_eq!(values[1]["max"], 5.2);
    assert!(values[1].get("min").is_none());
}

#[tokio::test]
async fn test_temperature_without_methods_returns_samples() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();

    let body: Value = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .add_query_param("timeAt", "2021-09-01T12:00:00Z")
        .add_query_param("endTimeAt", "2021-09-01T14:00:00Z")
        .await
        .json();
    let values = body["values"].as_array().unwrap();
    assert_eq!(values.len(), 5);
    assert_eq!(values[4]["value"], 5.23);
}

#[tokio::test]
async fn test_temperature_requires_sensor() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/temperature/air").await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("sensor"));
}

#[tokio::test]
async fn test_temperature_rejects_unsupported_duration() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();

    let response = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .add_query_param("aggrPeriodDuration", "P1M")
        .add_query_param("aggrMethods", "avg")
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("P1M"));
}

#[tokio::test]
async fn test_temperature_rejects_bad_times() {
    let (app, _) = test_app(test_source());
    let server = TestServer::new(app).unwrap();

    let response = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .add_query_param("timeAt", "yesterday")
        .await;
    response.assert_status_bad_request();

    let response = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .add_query_param("timeAt", "2021-09-02T00:00:00Z")
        .add_query_param("endTimeAt", "2021-09-01T00:00:00Z")
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_temperature_upstream_failure_is_bad_gateway() {
    let source = test_source();
    source.fail_all(true);
    let (app, _) = test_app(source);
    let server = TestServer::new(app).unwrap();

    let response = server
        .get("/api/temperature/air")
        .add_query_param("sensor", "sensor-1")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

// Shared test helpers: an in-memory EntitySource and cache wait helpers
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opendata_gateway::broker::{EntityFilter, EntitySource, SourceError};
use opendata_gateway::cache::{Keyed, RefreshableCache};
use opendata_gateway::models::{Position, TimeSeriesSample};
use opendata_gateway::services::BrokerContext;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[broker]
url = "http://localhost:1026"
tenant = "default"
page_size = 100

[refresh]
success_interval_secs = 300
failure_interval_secs = 10

[beaches]
max_water_quality_distance_m = 1000
water_quality_max_age_hours = 24
"#;

#[derive(Default)]
pub struct FakeSource {
    entities: Mutex<HashMap<String, Vec<Value>>>,
    near: Mutex<HashMap<(String, String), Vec<Value>>>,
    temporal: Mutex<HashMap<String, Vec<TimeSeriesSample>>>,
    failing: AtomicBool,
    failing_types: Mutex<HashSet<String>>,
    near_delay: Option<Duration>,
    near_in_flight: AtomicUsize,
    pub max_near_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

fn point_key(p: Position) -> String {
    format!("{:.6},{:.6}", p.lon, p.lat)
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(self, entity_type: &str, values: Vec<Value>) -> Self {
        self.set_entities(entity_type, values);
        self
    }

    pub fn set_entities(&self, entity_type: &str, values: Vec<Value>) {
        self.entities
            .lock()
            .unwrap()
            .insert(entity_type.to_owned(), values);
    }

    /// Answer for a near-query of `entity_type` centred exactly on `point`.
    pub fn with_near(self, entity_type: &str, point: Position, values: Vec<Value>) -> Self {
        self.near
            .lock()
            .unwrap()
            .insert((entity_type.to_owned(), point_key(point)), values);
        self
    }

    /// Holds every near-query open for `delay` so overlapping calls can be counted.
    pub fn with_near_delay(mut self, delay: Duration) -> Self {
        self.near_delay = Some(delay);
        self
    }

    pub fn with_temporal(self, entity_id: &str, samples: Vec<TimeSeriesSample>) -> Self {
        self.temporal
            .lock()
            .unwrap()
            .insert(entity_id.to_owned(), samples);
        self
    }

    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fail_type(&self, entity_type: &str) {
        self.failing_types
            .lock()
            .unwrap()
            .insert(entity_type.to_owned());
    }

    fn check_failure(&self, entity_type: &str) -> Result<(), SourceError> {
        if self.failing.load(Ordering::SeqCst)
            || self.failing_types.lock().unwrap().contains(entity_type)
        {
            return Err(SourceError::Status {
                status: 503,
                body: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntitySource for FakeSource {
    async fn query_entities(
        &self,
        _tenant: &str,
        entity_type: &str,
        filter: &EntityFilter,
    ) -> Result<Vec<Value>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(entity_type)?;
        let values = match filter.near {
            Some(near) => {
                let values = self
                    .near
                    .lock()
                    .unwrap()
                    .get(&(entity_type.to_owned(), point_key(near.point)))
                    .cloned();
                let in_flight = self.near_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_near_in_flight.fetch_max(in_flight, Ordering::SeqCst);
                if let Some(delay) = self.near_delay {
                    tokio::time::sleep(delay).await;
                }
                self.near_in_flight.fetch_sub(1, Ordering::SeqCst);
                values
            }
            None => self.entities.lock().unwrap().get(entity_type).cloned(),
        };
        Ok(values.unwrap_or_default())
    }

    async fn query_temporal(
        &self,
        _tenant: &str,
        entity_id: &str,
        _attribute: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeSeriesSample>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure("temporal")?;
        let samples = self
            .temporal
            .lock()
            .unwrap()
            .get(entity_id)
            .cloned()
            .unwrap_or_default();
        Ok(samples
            .into_iter()
            .filter(|s| s.timestamp >= from && s.timestamp <= to)
            .collect())
    }
}

pub fn broker_context(source: Arc<FakeSource>) -> BrokerContext {
    BrokerContext::new(source, "default")
}

/// Waits until the cache has finished at least one refresh attempt.
pub async fn refreshed<T>(cache: &RefreshableCache<T>)
where
    T: Keyed + Send + Sync + 'static,
{
    let mut rx = cache.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.has_succeeded() || s.consecutive_failures > 0),
    )
    .await
    .expect("timed out waiting for refresh")
    .expect("refresh loop dropped");
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap()
        .with_timezone(&Utc)
}

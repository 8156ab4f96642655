// Dataset services: one RefreshableCache per dataset, fed from the context broker.

pub mod air_quality;
pub mod beaches;
pub mod cityworks;
pub mod road_accidents;
pub mod sports;
pub mod temperature;
pub mod trails;
pub mod water_quality;
pub mod weather;

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::broker::{EntityFilter, EntitySource, SourceError};
use crate::cache::{Keyed, ManagedCache, Refresh, RefreshState, RefreshableCache};
use crate::config::AppConfig;
use crate::models::{
    AirQuality, Beach, CityWork, ExerciseTrail, RoadAccident, SportsField, SportsVenue,
    WaterQuality, WeatherObservation,
};

/// Where a dataset reads from: the entity source and the tenant to query.
#[derive(Clone)]
pub struct BrokerContext {
    pub source: Arc<dyn EntitySource>,
    pub tenant: String,
}

impl BrokerContext {
    pub fn new(source: Arc<dyn EntitySource>, tenant: impl Into<String>) -> Self {
        Self {
            source,
            tenant: tenant.into(),
        }
    }
}

/// Queries `entity_type` and decodes each record on its own; records that do
/// not decode are logged and dropped.
pub async fn fetch_records<R: DeserializeOwned>(
    ctx: &BrokerContext,
    entity_type: &str,
    filter: &EntityFilter,
) -> Result<Vec<R>, SourceError> {
    let values = ctx
        .source
        .query_entities(&ctx.tenant, entity_type, filter)
        .await?;
    Ok(decode_records(entity_type, values))
}

pub fn decode_records<R: DeserializeOwned>(entity_type: &str, values: Vec<Value>) -> Vec<R> {
    let total = values.len();
    let records: Vec<R> = values
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<missing id>")
                .to_owned();
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(entity_type, id = %id, error = %e, "skipping undecodable entity");
                    None
                }
            }
        })
        .collect();
    if records.len() < total {
        warn!(
            entity_type,
            decoded = records.len(),
            total,
            "some entities were skipped"
        );
    }
    records
}

/// Refresher for datasets that are a straight query-decode-transform of one
/// entity type. `transform` may drop a record by returning `None`.
pub struct EntityRefresher<R, T> {
    ctx: BrokerContext,
    entity_type: &'static str,
    transform: fn(R) -> Option<T>,
    _raw: PhantomData<fn() -> R>,
}

impl<R, T> EntityRefresher<R, T> {
    pub fn new(ctx: BrokerContext, entity_type: &'static str, transform: fn(R) -> Option<T>) -> Self {
        Self {
            ctx,
            entity_type,
            transform,
            _raw: PhantomData,
        }
    }
}

#[async_trait]
impl<R, T> Refresh<T> for EntityRefresher<R, T>
where
    R: DeserializeOwned + Send + 'static,
    T: Send + 'static,
{
    async fn refresh(&self) -> anyhow::Result<Vec<T>> {
        let raws: Vec<R> = fetch_records(&self.ctx, self.entity_type, &EntityFilter::all()).await?;
        Ok(raws.into_iter().filter_map(self.transform).collect())
    }
}

/// Every dataset cache, constructed once at startup.
pub struct Datasets {
    pub beaches: Arc<RefreshableCache<Beach>>,
    pub exercise_trails: Arc<RefreshableCache<ExerciseTrail>>,
    pub sports_fields: Arc<RefreshableCache<SportsField>>,
    pub sports_venues: Arc<RefreshableCache<SportsVenue>>,
    pub road_accidents: Arc<RefreshableCache<RoadAccident>>,
    pub cityworks: Arc<RefreshableCache<CityWork>>,
    pub air_quality: Arc<RefreshableCache<AirQuality>>,
    pub water_quality: Arc<RefreshableCache<WaterQuality>>,
    pub weather: Arc<RefreshableCache<WeatherObservation>>,
}

impl Datasets {
    pub fn new(ctx: &BrokerContext, config: &AppConfig) -> Self {
        let policy = config.refresh.policy();
        Self {
            beaches: Arc::new(beaches::cache(ctx.clone(), &config.beaches, policy)),
            exercise_trails: Arc::new(trails::cache(ctx.clone(), policy)),
            sports_fields: Arc::new(sports::fields_cache(ctx.clone(), policy)),
            sports_venues: Arc::new(sports::venues_cache(ctx.clone(), policy)),
            road_accidents: Arc::new(road_accidents::cache(ctx.clone(), policy)),
            cityworks: Arc::new(cityworks::cache(ctx.clone(), policy)),
            air_quality: Arc::new(air_quality::cache(ctx.clone(), policy)),
            water_quality: Arc::new(water_quality::cache(ctx.clone(), policy)),
            weather: Arc::new(weather::cache(ctx.clone(), policy)),
        }
    }

    /// (route name, cache) for every dataset.
    pub fn entries(&self) -> [(&'static str, &dyn ManagedCache); 9] {
        [
            ("beaches", managed(&self.beaches)),
            ("exercisetrails", managed(&self.exercise_trails)),
            ("sportsfields", managed(&self.sports_fields)),
            ("sportsvenues", managed(&self.sports_venues)),
            ("roadaccidents", managed(&self.road_accidents)),
            ("cityworks", managed(&self.cityworks)),
            ("airquality", managed(&self.air_quality)),
            ("waterqualities", managed(&self.water_quality)),
            ("weather", managed(&self.weather)),
        ]
    }

    /// Starts every refresh loop; returns how many were newly started.
    pub fn start_all(&self) -> usize {
        let started = self
            .entries()
            .iter()
            .filter(|(_, cache)| cache.start())
            .count();
        info!(started, "dataset refresh loops started");
        started
    }

    /// Stops every refresh loop and waits for all of them to exit.
    pub async fn shutdown_all(&self) {
        let entries = self.entries();
        join_all(entries.iter().map(|(_, cache)| cache.shutdown())).await;
        info!("dataset refresh loops stopped");
    }

    pub fn statuses(&self) -> BTreeMap<&'static str, RefreshState> {
        self.entries()
            .iter()
            .map(|(name, cache)| (*name, cache.status()))
            .collect()
    }
}

fn managed<T>(cache: &Arc<RefreshableCache<T>>) -> &dyn ManagedCache
where
    T: Keyed + Send + Sync + 'static,
{
    cache.as_ref()
}

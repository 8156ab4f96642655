// Beaches: boundary centroid plus the latest water temperature measured nearby.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use super::water_quality::{self, RawWaterQuality};
use super::{BrokerContext, fetch_records};
use crate::broker::EntityFilter;
use crate::cache::{Refresh, RefreshPolicy, RefreshableCache};
use crate::config::BeachesConfig;
use crate::models::{
    Beach, BeachWaterQuality, Geometry, Position, WaterQuality, lenient_geometry, string_list,
};

pub const ENTITY_TYPE: &str = "Beach";
pub const KIND: &str = "beach";
/// Water quality near-queries in flight at once during a refresh.
pub const MAX_CONCURRENT_LOOKUPS: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBeach {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "string_list")]
    see_also: Vec<String>,
}

fn transform(raw: RawBeach) -> Beach {
    Beach {
        location: raw.location.as_ref().and_then(Geometry::centroid),
        id: raw.id,
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        boundary: raw.location,
        see_also: raw.see_also,
        water_quality: None,
    }
}

/// The newest reading younger than `max_age`, compared by observation time
/// rather than by the order upstream returned them in.
pub fn latest_reading(
    readings: impl IntoIterator<Item = WaterQuality>,
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> Option<BeachWaterQuality> {
    readings
        .into_iter()
        .filter(|r| now - r.date_observed < max_age)
        .max_by_key(|r| r.date_observed)
        .map(|r| BeachWaterQuality {
            temperature: r.temperature,
            date_observed: r.date_observed,
            source: r.source,
        })
}

pub struct BeachRefresher {
    ctx: BrokerContext,
    max_distance_m: u32,
    max_age: TimeDelta,
}

impl BeachRefresher {
    pub fn new(ctx: BrokerContext, config: &BeachesConfig) -> Self {
        Self {
            ctx,
            max_distance_m: config.max_water_quality_distance_m,
            max_age: TimeDelta::hours(i64::from(config.water_quality_max_age_hours)),
        }
    }

    /// A failed lookup leaves the beach without a reading; it never fails the refresh.
    async fn nearby_water_quality(
        &self,
        beach_id: &str,
        centroid: Position,
        now: DateTime<Utc>,
    ) -> Option<BeachWaterQuality> {
        let filter = EntityFilter::near(centroid, self.max_distance_m);
        match fetch_records::<RawWaterQuality>(&self.ctx, water_quality::ENTITY_TYPE, &filter)
            .await
        {
            Ok(raws) => latest_reading(
                raws.into_iter().filter_map(water_quality::transform),
                now,
                self.max_age,
            ),
            Err(e) => {
                warn!(beach = beach_id, error = %e, "water quality lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl Refresh<Beach> for BeachRefresher {
    async fn refresh(&self) -> anyhow::Result<Vec<Beach>> {
        let raws: Vec<RawBeach> = fetch_records(&self.ctx, ENTITY_TYPE, &EntityFilter::all()).await?;
        let mut beaches: Vec<Beach> = raws.into_iter().map(transform).collect();

        let now = Utc::now();
        let lookups: Vec<_> = beaches
            .iter()
            .map(|b| async move {
                match b.location {
                    Some(centroid) => self.nearby_water_quality(&b.id, centroid, now).await,
                    None => None,
                }
            })
            .collect();
        let readings: Vec<_> = stream::iter(lookups)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;
        for (beach, reading) in beaches.iter_mut().zip(readings) {
            beach.water_quality = reading;
        }

        debug!(
            count = beaches.len(),
            with_water_quality = beaches.iter().filter(|b| b.water_quality.is_some()).count(),
            "beaches transformed"
        );
        Ok(beaches)
    }
}

pub fn cache(
    ctx: BrokerContext,
    config: &BeachesConfig,
    policy: RefreshPolicy,
) -> RefreshableCache<Beach> {
    RefreshableCache::new(KIND, policy, BeachRefresher::new(ctx, config))
}

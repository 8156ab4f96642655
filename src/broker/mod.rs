// Context broker access. `EntitySource` is the seam the datasets depend on;
// `ContextBrokerClient` is the NGSI-LD HTTP implementation.

mod client;
mod temporal;

pub use client::ContextBrokerClient;
pub use temporal::decode_temporal_values;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Position, TimeSeriesSample};

/// Upstream failures. All of them are transient from the caches' point of view.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("context broker request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("context broker returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed context broker response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("context broker paging did not terminate: {0}")]
    Paging(String),
}

/// Restricts an entity query to entities near a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearFilter {
    pub point: Position,
    pub max_distance_m: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    pub near: Option<NearFilter>,
}

impl EntityFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn near(point: Position, max_distance_m: u32) -> Self {
        Self {
            near: Some(NearFilter {
                point,
                max_distance_m,
            }),
        }
    }
}

#[async_trait]
pub trait EntitySource: Send + Sync {
    /// All entities of `entity_type` in simplified (key-value) form.
    async fn query_entities(
        &self,
        tenant: &str,
        entity_type: &str,
        filter: &EntityFilter,
    ) -> Result<Vec<Value>, SourceError>;

    /// Values of one attribute of one entity in `[from, to]`, ascending by time.
    async fn query_temporal(
        &self,
        tenant: &str,
        entity_id: &str,
        attribute: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeSeriesSample>, SourceError>;
}

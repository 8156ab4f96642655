// NGSI-LD context broker client over reqwest

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{EntityFilter, EntitySource, SourceError, decode_temporal_values};
use crate::config::BrokerConfig;
use crate::models::TimeSeriesSample;
use crate::version::USER_AGENT;

const TENANT_HEADER: &str = "NGSILD-Tenant";
const DEFAULT_TENANT: &str = "default";
/// Error bodies are cut to this many characters before they go into an error.
const MAX_ERROR_BODY: usize = 500;
/// Upper bound on pages fetched for one entity query.
pub const MAX_PAGES: usize = 1000;

#[derive(Debug, Clone)]
pub struct ContextBrokerClient {
    client: reqwest::Client,
    base_url: Url,
    page_size: usize,
}

impl ContextBrokerClient {
    pub fn new(config: &BrokerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(4)
            .build()?;
        Self::from_reqwest(&config.url, client, config.page_size)
    }

    /// Wraps an existing reqwest client (tests point this at a mock server).
    pub fn from_reqwest(
        base_url: &str,
        client: reqwest::Client,
        page_size: usize,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid broker url {}: {}", base_url, e))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "broker url cannot carry a path: {}",
            base_url
        );
        Ok(Self {
            client,
            base_url,
            page_size: page_size.max(1),
        })
    }

    /// Appends `segments` to the base path, percent-encoding each one, so ids from
    /// callers can never add path segments or a query string.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // from_reqwest rejected cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_tenant(req: reqwest::RequestBuilder, tenant: &str) -> reqwest::RequestBuilder {
        if tenant.is_empty() || tenant == DEFAULT_TENANT {
            req
        } else {
            req.header(TENANT_HEADER, tenant)
        }
    }

    async fn send_json<R: DeserializeOwned>(
        req: reqwest::RequestBuilder,
    ) -> Result<R, SourceError> {
        let resp = req.header(ACCEPT, "application/ld+json").send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl EntitySource for ContextBrokerClient {
    async fn query_entities(
        &self,
        tenant: &str,
        entity_type: &str,
        filter: &EntityFilter,
    ) -> Result<Vec<Value>, SourceError> {
        let url = self.endpoint(&["ngsi-ld", "v1", "entities"]);
        let limit = self.page_size.to_string();
        let geo = filter.near.map(|near| {
            (
                format!("near;maxDistance=={}", near.max_distance_m),
                format!("[{},{}]", near.point.lon, near.point.lat),
            )
        });

        let mut entities = Vec::new();
        let mut offset = 0usize;
        let mut previous: Option<Vec<Value>> = None;
        for pages in 1.. {
            if pages > MAX_PAGES {
                return Err(SourceError::Paging(format!(
                    "{entity_type}: more than {MAX_PAGES} full pages"
                )));
            }
            let offset_param = offset.to_string();
            let mut req = self.client.get(url.clone()).query(&[
                ("type", entity_type),
                ("limit", limit.as_str()),
                ("offset", offset_param.as_str()),
                ("options", "keyValues"),
            ]);
            if let Some((georel, coordinates)) = &geo {
                req = req.query(&[
                    ("georel", georel.as_str()),
                    ("geometry", "Point"),
                    ("coordinates", coordinates.as_str()),
                ]);
            }
            let page: Vec<Value> = Self::send_json(Self::with_tenant(req, tenant)).await?;
            let n = page.len();
            if n < self.page_size {
                entities.extend(page);
                break;
            }
            // A broker that ignores `offset` keeps answering with the same full page.
            if previous.as_ref() == Some(&page) {
                return Err(SourceError::Paging(format!(
                    "{entity_type}: offset {offset} returned the previous page again"
                )));
            }
            entities.extend(page.iter().cloned());
            previous = Some(page);
            offset += n;
        }

        debug!(
            operation = "query_entities",
            entity_type,
            tenant,
            count = entities.len(),
            "entities fetched"
        );
        Ok(entities)
    }

    async fn query_temporal(
        &self,
        tenant: &str,
        entity_id: &str,
        attribute: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeSeriesSample>, SourceError> {
        let url = self.endpoint(&["ngsi-ld", "v1", "temporal", "entities", entity_id]);
        let time_at = from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end_time_at = to.to_rfc3339_opts(SecondsFormat::Secs, true);
        let req = self.client.get(url).query(&[
            ("attrs", attribute),
            ("timerel", "between"),
            ("timeAt", time_at.as_str()),
            ("endTimeAt", end_time_at.as_str()),
            ("options", "temporalValues"),
        ]);
        let body: Value = Self::send_json(Self::with_tenant(req, tenant)).await?;
        let samples = decode_temporal_values(&body, attribute);

        debug!(
            operation = "query_temporal",
            entity_id,
            attribute,
            count = samples.len(),
            "temporal values fetched"
        );
        Ok(samples)
    }
}

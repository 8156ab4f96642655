// Sports fields and sports venues. Both carry string-or-array categories.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{
    Geometry, SportsField, SportsVenue, lenient_datetime, lenient_geometry, string_list,
};

pub const FIELD_ENTITY_TYPE: &str = "SportsField";
pub const FIELD_KIND: &str = "sports field";
pub const VENUE_ENTITY_TYPE: &str = "SportsVenue";
pub const VENUE_KIND: &str = "sports venue";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSportsField {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    category: Vec<String>,
    #[serde(default)]
    public_access: Option<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_last_preparation: Option<DateTime<Utc>>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    see_also: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSportsVenue {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    category: Vec<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    managed_by: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    see_also: Vec<String>,
}

fn transform_field(raw: RawSportsField) -> Option<SportsField> {
    Some(SportsField {
        location: raw.location.as_ref().and_then(Geometry::centroid),
        id: raw.id,
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        categories: raw.category,
        public_access: raw.public_access,
        boundary: raw.location,
        date_created: raw.date_created,
        date_modified: raw.date_modified,
        date_last_preparation: raw.date_last_preparation,
        source: raw.source,
        see_also: raw.see_also,
    })
}

fn transform_venue(raw: RawSportsVenue) -> Option<SportsVenue> {
    Some(SportsVenue {
        location: raw.location.as_ref().and_then(Geometry::centroid),
        id: raw.id,
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        categories: raw.category,
        boundary: raw.location,
        date_created: raw.date_created,
        date_modified: raw.date_modified,
        managed_by: raw.managed_by,
        source: raw.source,
        see_also: raw.see_also,
    })
}

pub fn fields_cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<SportsField> {
    RefreshableCache::new(
        FIELD_KIND,
        policy,
        EntityRefresher::new(ctx, FIELD_ENTITY_TYPE, transform_field),
    )
}

pub fn venues_cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<SportsVenue> {
    RefreshableCache::new(
        VENUE_KIND,
        policy,
        EntityRefresher::new(ctx, VENUE_ENTITY_TYPE, transform_venue),
    )
}

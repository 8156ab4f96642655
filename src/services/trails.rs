// Exercise trails

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{BrokerContext, EntityRefresher};
use crate::cache::{RefreshPolicy, RefreshableCache};
use crate::models::{
    ExerciseTrail, Geometry, lenient_datetime, lenient_geometry, round_to, string_list,
};

pub const ENTITY_TYPE: &str = "ExerciseTrail";
pub const KIND: &str = "exercise trail";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExerciseTrail {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    category: Vec<String>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_required: Option<Value>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    date_last_preparation: Option<DateTime<Utc>>,
    #[serde(default)]
    area_served: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    see_also: Vec<String>,
    #[serde(default, deserialize_with = "lenient_geometry")]
    location: Option<Geometry>,
}

/// Upstream uses "yes"/"no" strings; booleans are accepted too.
pub fn payment_required(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true"),
        _ => false,
    }
}

fn transform(raw: RawExerciseTrail) -> Option<ExerciseTrail> {
    Some(ExerciseTrail {
        payment_required: payment_required(raw.payment_required.as_ref()),
        id: raw.id,
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        categories: raw.category,
        length: raw.length.map(|l| round_to(l, 2)),
        difficulty: raw.difficulty,
        status: raw.status,
        date_last_preparation: raw.date_last_preparation,
        area_served: raw.area_served,
        see_also: raw.see_also,
        location: raw.location,
    })
}

pub fn cache(ctx: BrokerContext, policy: RefreshPolicy) -> RefreshableCache<ExerciseTrail> {
    RefreshableCache::new(
        KIND,
        policy,
        EntityRefresher::new(ctx, ENTITY_TYPE, transform),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_required_variants() {
        assert!(payment_required(Some(&json!("yes"))));
        assert!(payment_required(Some(&json!(true))));
        assert!(!payment_required(Some(&json!("no"))));
        assert!(!payment_required(Some(&json!(1))));
        assert!(!payment_required(None));
    }
}

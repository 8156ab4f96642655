// Decoding of NGSI-LD temporal representations into samples

use serde_json::Value;
use tracing::warn;

use crate::models::{TimeSeriesSample, datetime_from_value};

/// Reads `attribute` from a temporal entity. Accepts the simplified form
/// (`{"values": [[21.3, "2021-09-01T12:00:00Z"], ...]}`) and the normalized
/// form (an array of `{"value": .., "observedAt": ..}` instances). Malformed
/// entries are skipped; the result is sorted by timestamp.
pub fn decode_temporal_values(entity: &Value, attribute: &str) -> Vec<TimeSeriesSample> {
    let Some(attr) = entity.get(attribute) else {
        return Vec::new();
    };

    let entries: Vec<&Value> = match attr {
        Value::Object(map) => match map.get("values") {
            Some(Value::Array(values)) => values.iter().collect(),
            _ => vec![attr],
        },
        Value::Array(instances) => instances.iter().collect(),
        _ => Vec::new(),
    };

    let mut samples: Vec<TimeSeriesSample> = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        match decode_entry(entry) {
            Some(s) => samples.push(s),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(attribute, skipped, "skipped malformed temporal values");
    }
    samples.sort_by_key(|s| s.timestamp);
    samples
}

fn decode_entry(entry: &Value) -> Option<TimeSeriesSample> {
    match entry {
        Value::Array(pair) => {
            let value = pair.first()?.as_f64()?;
            let timestamp = datetime_from_value(pair.get(1)?)?;
            Some(TimeSeriesSample::new(timestamp, value))
        }
        Value::Object(map) => {
            let value = map.get("value")?.as_f64()?;
            let timestamp = datetime_from_value(map.get("observedAt")?)?;
            Some(TimeSeriesSample::new(timestamp, value))
        }
        _ => None,
    }
}

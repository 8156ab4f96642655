// Shared field shapes: GeoJSON geometry, string-or-array lists, lenient dates, rounding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A GeoJSON position. Extra elements (altitude) are accepted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!("position needs at least 2 coordinates, got {}", v.len())),
        }
    }
}

impl From<Position> for Vec<f64> {
    fn from(p: Position) -> Self {
        vec![p.lon, p.lat]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// Outer ring of a polygon, or of the first polygon of a multipolygon.
    pub fn outer_ring(&self) -> Option<&[Position]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice),
            Geometry::MultiPolygon(polygons) => polygons
                .first()
                .and_then(|rings| rings.first())
                .map(Vec::as_slice),
            _ => None,
        }
    }

    /// Points pass through; polygons use the mean of their outer ring's vertices
    /// (closing vertex excluded), rounded to 6 decimals. Lines have no centroid.
    pub fn centroid(&self) -> Option<Position> {
        if let Geometry::Point(p) = self {
            return Some(*p);
        }
        let ring = self.outer_ring()?;
        let ring = match ring {
            [first, .., last] if first == last => &ring[..ring.len() - 1],
            _ => ring,
        };
        if ring.is_empty() {
            return None;
        }
        let n = ring.len() as f64;
        let lon = ring.iter().map(|p| p.lon).sum::<f64>() / n;
        let lat = ring.iter().map(|p| p.lat).sum::<f64>() / n;
        Some(Position::new(round_to(lon, 6), round_to(lat, 6)))
    }

    pub fn as_point(&self) -> Option<Position> {
        match self {
            Geometry::Point(p) => Some(*p),
            _ => None,
        }
    }
}

/// Upstream sends some list fields either as one string or as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    List(Vec<String>),
    One(String),
    Other(Value),
}

/// Deserializes a string-or-array field into a list. Absent or null gives an empty
/// list; anything else that is not a string or string array is kept best-effort
/// as its JSON text so the record is not lost.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::List(items)) => items,
        Some(StringOrList::One(s)) if s.is_empty() => Vec::new(),
        Some(StringOrList::One(s)) => vec![s],
        Some(StringOrList::Other(value)) => best_effort_strings(value),
    };
    Ok(list)
}

fn best_effort_strings(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Deserializes an optional timestamp, given either as an RFC 3339 string or as a
/// JSON-LD `{"@type": "DateTime", "@value": "..."}` object. Unparseable values
/// become `None` instead of failing the record.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(datetime_from_value))
}

pub(crate) fn datetime_from_value(value: &Value) -> Option<DateTime<Utc>> {
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("@value")?.as_str()?,
        _ => return None,
    };
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Deserializes an optional geometry; an unrecognised shape becomes `None`.
pub fn lenient_geometry<'de, D>(deserializer: D) -> Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

//! Firestore REST `Value` encoding.
//!
//! Documents travel as `{"fields": {"name": {"stringValue": "..."}}}`; this
//! module maps that representation to and from [`FieldValue`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Named fields of a document
pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Array(Vec<FieldValue>),
    Map(Fields),
    /// Full resource name of another document
    Reference(String),
    GeoPoint { latitude: f64, longitude: f64 },
    /// Base64 as sent on the wire
    Bytes(String),
    /// Any value kind not modelled above, kept verbatim so it round-trips
    Other(Value),
}

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("unsupported value: {0}")]
    Unsupported(String),
    #[error("invalid {kind}: {value}")]
    Invalid { kind: &'static str, value: String },
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => json!({ "nullValue": null }),
            FieldValue::Bool(b) => json!({ "booleanValue": b }),
            // int64 travels as a decimal string
            FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
            FieldValue::Double(d) => json!({ "doubleValue": d }),
            FieldValue::Timestamp(t) => {
                json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
            }
            FieldValue::String(s) => json!({ "stringValue": s }),
            FieldValue::Array(items) => {
                let values: Vec<Value> = items.iter().map(FieldValue::to_json).collect();
                json!({ "arrayValue": { "values": values } })
            }
            FieldValue::Map(fields) => json!({ "mapValue": { "fields": fields_to_json(fields) } }),
            FieldValue::Reference(name) => json!({ "referenceValue": name }),
            FieldValue::GeoPoint { latitude, longitude } => {
                json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } })
            }
            FieldValue::Bytes(b) => json!({ "bytesValue": b }),
            FieldValue::Other(raw) => raw.clone(),
        }
    }

    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValueError::Unsupported(value.to_string()))?;

        if obj.contains_key("nullValue") {
            return Ok(FieldValue::Null);
        }
        if let Some(b) = obj.get("booleanValue") {
            return b.as_bool().map(FieldValue::Bool).ok_or_else(|| invalid("booleanValue", b));
        }
        if let Some(i) = obj.get("integerValue") {
            let parsed = match i {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            return parsed.map(FieldValue::Integer).ok_or_else(|| invalid("integerValue", i));
        }
        if let Some(d) = obj.get("doubleValue") {
            let parsed = match d {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            };
            return parsed.map(FieldValue::Double).ok_or_else(|| invalid("doubleValue", d));
        }
        if let Some(t) = obj.get("timestampValue") {
            return t
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)))
                .ok_or_else(|| invalid("timestampValue", t));
        }
        if let Some(s) = obj.get("stringValue") {
            return s
                .as_str()
                .map(|s| FieldValue::String(s.to_string()))
                .ok_or_else(|| invalid("stringValue", s));
        }
        if let Some(a) = obj.get("arrayValue") {
            // Empty arrays come back as `{}`
            let items = match a.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(FieldValue::from_json).collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            return Ok(FieldValue::Array(items));
        }
        if let Some(m) = obj.get("mapValue") {
            let fields = match m.get("fields") {
                Some(f) => fields_from_json(f)?,
                None => Fields::new(),
            };
            return Ok(FieldValue::Map(fields));
        }
        if let Some(r) = obj.get("referenceValue") {
            return r
                .as_str()
                .map(|r| FieldValue::Reference(r.to_string()))
                .ok_or_else(|| invalid("referenceValue", r));
        }
        if let Some(g) = obj.get("geoPointValue") {
            // Zero coordinates are omitted from the JSON
            let coordinate = |name: &str| g.get(name).map_or(Some(0.0), Value::as_f64);
            return match (g.is_object(), coordinate("latitude"), coordinate("longitude")) {
                (true, Some(latitude), Some(longitude)) => Ok(FieldValue::GeoPoint { latitude, longitude }),
                _ => Err(invalid("geoPointValue", g)),
            };
        }
        if let Some(b) = obj.get("bytesValue") {
            return b
                .as_str()
                .map(|b| FieldValue::Bytes(b.to_string()))
                .ok_or_else(|| invalid("bytesValue", b));
        }

        Ok(FieldValue::Other(value.clone()))
    }
}

fn invalid(kind: &'static str, value: &Value) -> ValueError {
    ValueError::Invalid {
        kind,
        value: value.to_string(),
    }
}

pub fn fields_to_json(fields: &Fields) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    Value::Object(map)
}

pub fn fields_from_json(value: &Value) -> Result<Fields, ValueError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValueError::Unsupported(value.to_string()))?;
    obj.iter()
        .map(|(name, v)| Ok((name.clone(), FieldValue::from_json(v)?)))
        .collect()
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Map(fields)
    }
}

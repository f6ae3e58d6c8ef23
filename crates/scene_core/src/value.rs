//! Scene document representation.
//!
//! This module provides the value and document types validated against a
//! scene schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value in a scene document.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Nested object value
    Object(IndexMap<String, SceneValue>),
    /// List value
    List(Vec<SceneValue>),
}

impl SceneValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SceneValue::Null)
    }

    /// Returns true if this value carries no content.
    ///
    /// Null, whitespace-only strings, empty objects and empty lists are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            SceneValue::Null => true,
            SceneValue::String(s) => s.trim().is_empty(),
            SceneValue::Object(map) => map.is_empty(),
            SceneValue::List(items) => items.is_empty(),
            SceneValue::Int(_) | SceneValue::Float(_) | SceneValue::Bool(_) => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            SceneValue::Null => "null",
            SceneValue::String(_) => "string",
            SceneValue::Int(_) => "integer",
            SceneValue::Float(_) => "float",
            SceneValue::Bool(_) => "boolean",
            SceneValue::Object(_) => "object",
            SceneValue::List(_) => "array",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SceneValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SceneValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, SceneValue>> {
        match self {
            SceneValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to get this value as a list.
    pub fn as_list(&self) -> Option<&[SceneValue]> {
        match self {
            SceneValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual form of a scalar value, used for option and literal comparison.
    ///
    /// Returns `None` for null, objects and lists.
    pub fn as_literal(&self) -> Option<String> {
        match self {
            SceneValue::String(s) => Some(s.clone()),
            SceneValue::Int(i) => Some(i.to_string()),
            SceneValue::Float(f) => Some(f.to_string()),
            SceneValue::Bool(b) => Some(b.to_string()),
            SceneValue::Null | SceneValue::Object(_) | SceneValue::List(_) => None,
        }
    }
}

impl From<serde_json::Value> for SceneValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SceneValue::Null,
            serde_json::Value::Bool(b) => SceneValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SceneValue::Int(i),
                None => n.as_f64().map_or(SceneValue::Null, SceneValue::Float),
            },
            serde_json::Value::String(s) => SceneValue::String(s),
            serde_json::Value::Array(items) => {
                SceneValue::List(items.into_iter().map(SceneValue::from).collect())
            }
            serde_json::Value::Object(map) => SceneValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, SceneValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&SceneValue> for serde_json::Value {
    fn from(value: &SceneValue) -> Self {
        match value {
            SceneValue::Null => serde_json::Value::Null,
            SceneValue::String(s) => serde_json::Value::String(s.clone()),
            SceneValue::Int(i) => serde_json::Value::from(*i),
            SceneValue::Float(f) => serde_json::Value::from(*f),
            SceneValue::Bool(b) => serde_json::Value::Bool(*b),
            SceneValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            SceneValue::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

impl Serialize for SceneValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SceneValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(SceneValue::from)
    }
}

impl From<String> for SceneValue {
    fn from(s: String) -> Self {
        SceneValue::String(s)
    }
}

impl From<&str> for SceneValue {
    fn from(s: &str) -> Self {
        SceneValue::String(s.to_string())
    }
}

impl From<i64> for SceneValue {
    fn from(i: i64) -> Self {
        SceneValue::Int(i)
    }
}

impl From<f64> for SceneValue {
    fn from(f: f64) -> Self {
        SceneValue::Float(f)
    }
}

impl From<bool> for SceneValue {
    fn from(b: bool) -> Self {
        SceneValue::Bool(b)
    }
}

/// One candidate scene: a mapping from top-level field name to value.
///
/// Field order follows the source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneDocument {
    fields: IndexMap<String, SceneValue>,
}

impl SceneDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a top-level field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SceneValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Adds a top-level field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SceneValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a top-level field.
    pub fn get(&self, name: &str) -> Option<&SceneValue> {
        self.fields.get(name)
    }

    /// Iterates over the top-level fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &SceneValue)> {
        self.fields.iter()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Collects every value found at a dotted path.
    ///
    /// Lists encountered along the way are flattened, so `Characters.Name`
    /// yields one value per character when `Characters` is a list of objects.
    pub fn lookup(&self, path: &str) -> Vec<&SceneValue> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Vec::new();
        };
        let mut current: Vec<&SceneValue> = self.fields.get(first).into_iter().collect();

        for segment in segments {
            let mut next = Vec::new();
            for value in current {
                descend(value, segment, &mut next);
            }
            current = next;
        }

        current.into_iter().flat_map(flatten_list).collect()
    }

    /// Returns true if any value at the dotted path is non-empty.
    pub fn is_present(&self, path: &str) -> bool {
        self.lookup(path).iter().any(|v| !v.is_empty())
    }
}

fn descend<'a>(value: &'a SceneValue, segment: &str, out: &mut Vec<&'a SceneValue>) {
    match value {
        SceneValue::Object(map) => {
            if let Some(child) = map.get(segment) {
                out.push(child);
            }
        }
        SceneValue::List(items) => {
            for item in items {
                descend(item, segment, out);
            }
        }
        _ => {}
    }
}

fn flatten_list(value: &SceneValue) -> Vec<&SceneValue> {
    match value {
        SceneValue::List(items) => items.iter().flat_map(flatten_list).collect(),
        other => vec![other],
    }
}

impl From<IndexMap<String, SceneValue>> for SceneDocument {
    fn from(fields: IndexMap<String, SceneValue>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, SceneValue)> for SceneDocument {
    fn from_iter<I: IntoIterator<Item = (String, SceneValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

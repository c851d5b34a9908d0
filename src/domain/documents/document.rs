use serde_json::{Map, Value};

use crate::domain::documents::channels::ChannelSet;

/// Candidate document handed to the write authorizer.
///
/// Wraps the raw JSON object so field lookups keep the exact shape the
/// client sent (a missing field and an explicit `null` stay distinct).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    body: Map<String, Value>,
}

impl Document {
    pub fn new(body: Map<String, Value>) -> Self {
        Self { body }
    }

    /// Returns `None` unless the value is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(body) => Some(Self { body }),
            _ => None,
        }
    }

    /// Tombstone candidate produced by a delete request.
    pub fn tombstone(id: &str) -> Self {
        let mut body = Map::new();
        body.insert("_id".to_string(), Value::String(id.to_string()));
        body.insert("deleted".to_string(), Value::Bool(true));
        Self { body }
    }

    pub fn id(&self) -> Option<&Value> {
        self.body.get("_id")
    }

    pub fn id_str(&self) -> Option<&str> {
        self.id().and_then(Value::as_str)
    }

    pub fn rev(&self) -> Option<&str> {
        self.body.get("_rev").and_then(Value::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    pub fn channels(&self) -> Option<&Value> {
        self.body.get("channels")
    }

    /// Only the boolean `true` marks a tombstone; `1` or `"true"` do not.
    pub fn is_tombstone(&self) -> bool {
        matches!(self.body.get("deleted"), Some(Value::Bool(true)))
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.body.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.body.remove(name)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

/// Coarse document category taken from the first identifier segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Order,
    Job,
}

impl DocType {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "order" => Some(DocType::Order),
            "job" => Some(DocType::Job),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Order => "order",
            DocType::Job => "job",
        }
    }
}

/// A revision as held by the gateway's document store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub rev: String,
    // Body without the `_id` / `_rev` envelope fields
    pub body: Map<String, Value>,
    pub deleted: bool,
    pub channels: ChannelSet,
    pub sequence: u64,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

impl StoredDocument {
    /// Body as returned to clients, with `_id` and `_rev` restored.
    pub fn to_client_body(&self) -> Value {
        let mut body = Map::with_capacity(self.body.len() + 2);
        body.insert("_id".to_string(), Value::String(self.id.clone()));
        body.insert("_rev".to_string(), Value::String(self.rev.clone()));
        for (k, v) in &self.body {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }

    /// Previous revision in the shape the authorizer expects.
    pub fn to_document(&self) -> Document {
        match self.to_client_body() {
            Value::Object(body) => Document::new(body),
            _ => Document::default(),
        }
    }
}

/// Latest change recorded for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    pub sequence: u64,
    pub id: String,
    pub rev: String,
    pub deleted: bool,
    pub channels: ChannelSet,
}

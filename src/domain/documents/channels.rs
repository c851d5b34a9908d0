use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grants visibility of every channel.
pub const ALL_CHANNELS: &str = "*";

/// Channel names a document belongs to, or a user may read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSet(BTreeSet<String>);

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Channel assignment from a `channels` field value.
    ///
    /// A string names one channel, an array names each of its string
    /// elements. Any other value assigns no channels.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::from_names([name.as_str()]),
            Value::Array(items) => {
                Self::from_names(items.iter().filter_map(Value::as_str).filter(|s| !s.is_empty()))
            }
            _ => Self::new(),
        }
    }

    /// Comma separated list, as used by the `channels` query parameter.
    pub fn parse_list(raw: &str) -> Self {
        Self::from_names(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn grants_all(&self) -> bool {
        self.contains(ALL_CHANNELS)
    }

    pub fn intersects(&self, other: &ChannelSet) -> bool {
        self.0.iter().any(|c| other.0.contains(c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

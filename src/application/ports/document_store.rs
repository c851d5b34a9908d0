use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::documents::channels::ChannelSet;
use crate::domain::documents::document::{ChangeEntry, StoredDocument};

/// A revision to be written on top of `expected_rev`.
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub id: String,
    // None => the document must not exist (or must be a tombstone)
    pub expected_rev: Option<String>,
    pub body: Map<String, Value>,
    pub deleted: bool,
    pub channels: ChannelSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { rev: String, sequence: u64 },
    Conflict,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current revision, tombstones included.
    async fn get(&self, id: &str) -> anyhow::Result<Option<StoredDocument>>;

    async fn save(&self, write: DocumentWrite) -> anyhow::Result<SaveOutcome>;

    /// Removes every trace of the document. Returns false if it was unknown.
    async fn purge(&self, id: &str) -> anyhow::Result<bool>;

    /// Latest change per document with a sequence above `since`, in sequence order.
    async fn changes_since(&self, since: u64) -> anyhow::Result<Vec<ChangeEntry>>;

    async fn last_sequence(&self) -> anyhow::Result<u64>;
}

/// A write must name the current revision of a live document. A new or
/// tombstoned document accepts a write without a revision, or naming the
/// tombstone's revision.
pub fn revision_matches(current: Option<&StoredDocument>, expected: Option<&str>) -> bool {
    match current {
        None => expected.is_none(),
        Some(doc) if doc.deleted => expected.is_none() || expected == Some(doc.rev.as_str()),
        Some(doc) => expected == Some(doc.rev.as_str()),
    }
}

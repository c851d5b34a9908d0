use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::document_store::{
    DocumentStore, DocumentWrite, SaveOutcome, revision_matches,
};
use crate::domain::documents::document::{ChangeEntry, StoredDocument};
use crate::domain::documents::revision::next_revision;

#[derive(Default)]
struct StoreState {
    docs: HashMap<String, StoredDocument>,
    last_seq: u64,
}

/// Process-local document store. Writes are serialized by the lock, so the
/// revision check and sequence allocation of one write are atomic.
#[derive(Default)]
pub struct MemoryDocumentStore {
    state: RwLock<StoreState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<StoredDocument>> {
        Ok(self.state.read().await.docs.get(id).cloned())
    }

    async fn save(&self, write: DocumentWrite) -> anyhow::Result<SaveOutcome> {
        let mut state = self.state.write().await;
        let current = state.docs.get(&write.id);
        if !revision_matches(current, write.expected_rev.as_deref()) {
            return Ok(SaveOutcome::Conflict);
        }
        let parent = current.map(|c| c.rev.clone());
        let rev = next_revision(parent.as_deref(), &write.body, write.deleted);

        state.last_seq += 1;
        let sequence = state.last_seq;
        state.docs.insert(
            write.id.clone(),
            StoredDocument {
                id: write.id,
                rev: rev.clone(),
                body: write.body,
                deleted: write.deleted,
                channels: write.channels,
                sequence,
                saved_at: chrono::Utc::now(),
            },
        );
        Ok(SaveOutcome::Saved { rev, sequence })
    }

    async fn purge(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.state.write().await.docs.remove(id).is_some())
    }

    async fn changes_since(&self, since: u64) -> anyhow::Result<Vec<ChangeEntry>> {
        let state = self.state.read().await;
        let mut changes: Vec<ChangeEntry> = state
            .docs
            .values()
            .filter(|d| d.sequence > since)
            .map(|d| ChangeEntry {
                sequence: d.sequence,
                id: d.id.clone(),
                rev: d.rev.clone(),
                deleted: d.deleted,
                channels: d.channels.clone(),
            })
            .collect();
        changes.sort_by_key(|c| c.sequence);
        Ok(changes)
    }

    async fn last_sequence(&self) -> anyhow::Result<u64> {
        Ok(self.state.read().await.last_seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::channels::ChannelSet;
    use crate::domain::documents::revision::generation;
    use serde_json::{Map, json};

    fn write(id: &str, expected_rev: Option<&str>, deleted: bool) -> DocumentWrite {
        let mut body = Map::new();
        body.insert("channels".into(), json!("public"));
        DocumentWrite {
            id: id.into(),
            expected_rev: expected_rev.map(str::to_string),
            body,
            deleted,
            channels: ChannelSet::from_names(["public"]),
        }
    }

    fn saved_rev(outcome: SaveOutcome) -> String {
        match outcome {
            SaveOutcome::Saved { rev, .. } => rev,
            SaveOutcome::Conflict => panic!("unexpected conflict"),
        }
    }

    #[tokio::test]
    async fn stale_revision_conflicts() {
        let store = MemoryDocumentStore::new();
        let first = saved_rev(store.save(write("order-1", None, false)).await.unwrap());
        assert_eq!(generation(&first), Some(1));

        assert_eq!(
            store.save(write("order-1", None, false)).await.unwrap(),
            SaveOutcome::Conflict
        );
        assert_eq!(
            store.save(write("order-1", Some("1-nope"), false)).await.unwrap(),
            SaveOutcome::Conflict
        );

        let second = saved_rev(store.save(write("order-1", Some(first.as_str()), false)).await.unwrap());
        assert_eq!(generation(&second), Some(2));
        assert_eq!(store.get("order-1").await.unwrap().unwrap().rev, second);
    }

    #[tokio::test]
    async fn tombstone_can_be_recreated_without_revision() {
        let store = MemoryDocumentStore::new();
        let first = saved_rev(store.save(write("order-1", None, false)).await.unwrap());
        let tomb = saved_rev(store.save(write("order-1", Some(first.as_str()), true)).await.unwrap());
        let again = saved_rev(store.save(write("order-1", None, false)).await.unwrap());
        assert_eq!(generation(&tomb), Some(2));
        assert_eq!(generation(&again), Some(3));
    }

    #[tokio::test]
    async fn changes_keep_latest_sequence_per_document() {
        let store = MemoryDocumentStore::new();
        let a = saved_rev(store.save(write("order-1", None, false)).await.unwrap());
        store.save(write("order-2", None, false)).await.unwrap();
        store.save(write("order-1", Some(a.as_str()), false)).await.unwrap();

        let changes = store.changes_since(0).await.unwrap();
        let ids: Vec<_> = changes.iter().map(|c| (c.id.as_str(), c.sequence)).collect();
        assert_eq!(ids, vec![("order-2", 2), ("order-1", 3)]);
        assert_eq!(store.changes_since(2).await.unwrap().len(), 1);
        assert_eq!(store.last_sequence().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn purge_forgets_document() {
        let store = MemoryDocumentStore::new();
        store.save(write("order-1", None, false)).await.unwrap();
        assert!(store.purge("order-1").await.unwrap());
        assert!(!store.purge("order-1").await.unwrap());
        assert!(store.get("order-1").await.unwrap().is_none());
        assert!(store.changes_since(0).await.unwrap().is_empty());
        // A purged ID starts a fresh revision history
        let rev = saved_rev(store.save(write("order-1", None, false)).await.unwrap());
        assert_eq!(generation(&rev), Some(1));
    }
}

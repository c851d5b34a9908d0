use crate::application::access::Actor;
use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::GatewayError;
use crate::domain::documents::channels::ChannelSet;
use crate::domain::documents::document::ChangeEntry;

#[derive(Debug, Clone)]
pub struct ChangesFeed {
    pub results: Vec<ChangeEntry>,
    pub last_seq: u64,
}

pub struct ListChanges<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> ListChanges<'a, S> {
    /// Changes after `since` visible to `actor`, optionally narrowed to `only`.
    pub async fn execute(
        &self,
        actor: &Actor,
        since: u64,
        only: Option<&ChannelSet>,
    ) -> Result<ChangesFeed, GatewayError> {
        let results: Vec<ChangeEntry> = self
            .store
            .changes_since(since)
            .await?
            .into_iter()
            .filter(|c| actor.can_read(&c.channels))
            .filter(|c| only.map(|f| f.intersects(&c.channels)).unwrap_or(true))
            .collect();
        let last_seq = results.last().map(|c| c.sequence).unwrap_or(since);
        Ok(ChangesFeed { results, last_seq })
    }
}

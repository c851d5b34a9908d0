use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::GatewayError;

pub struct PurgeDocuments<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> PurgeDocuments<'a, S> {
    /// Returns the IDs that existed and were removed.
    pub async fn execute(&self, ids: &[String]) -> Result<Vec<String>, GatewayError> {
        let mut purged = Vec::new();
        for id in ids {
            if self.store.purge(id).await? {
                purged.push(id.clone());
            }
        }
        tracing::info!(requested = ids.len(), purged = purged.len(), "documents_purged");
        Ok(purged)
    }
}

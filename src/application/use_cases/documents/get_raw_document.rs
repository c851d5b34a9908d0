use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::GatewayError;
use crate::domain::documents::document::StoredDocument;

pub struct GetRawDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> GetRawDocument<'a, S> {
    // Tombstones included
    pub async fn execute(&self, id: &str) -> Result<StoredDocument, GatewayError> {
        self.store.get(id).await?.ok_or(GatewayError::NotFound)
    }
}

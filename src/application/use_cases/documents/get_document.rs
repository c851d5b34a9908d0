use serde_json::Value;

use crate::application::access::Actor;
use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::GatewayError;

pub struct GetDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> GetDocument<'a, S> {
    pub async fn execute(&self, actor: &Actor, id: &str) -> Result<Value, GatewayError> {
        let doc = match self.store.get(id).await? {
            Some(doc) if !doc.deleted => doc,
            _ => return Err(GatewayError::NotFound),
        };
        if !actor.can_read(&doc.channels) {
            return Err(GatewayError::NoChannelAccess);
        }
        Ok(doc.to_client_body())
    }
}

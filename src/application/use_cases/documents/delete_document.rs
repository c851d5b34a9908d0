use crate::application::access::{Actor, WriteAuthorizer};
use crate::application::ports::document_store::{DocumentStore, DocumentWrite, SaveOutcome};
use crate::application::use_cases::documents::error::GatewayError;
use crate::application::use_cases::documents::put_document::WriteResult;
use crate::domain::documents::document::Document;

pub struct DeleteDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
    pub authorizer: &'a WriteAuthorizer,
}

impl<'a, S: DocumentStore + ?Sized> DeleteDocument<'a, S> {
    /// Writes a tombstone revision on top of `rev`.
    pub async fn execute(
        &self,
        actor: &Actor,
        id: &str,
        rev: Option<&str>,
    ) -> Result<WriteResult, GatewayError> {
        let current = match self.store.get(id).await? {
            Some(doc) if !doc.deleted => doc,
            _ => return Err(GatewayError::NotFound),
        };
        if rev != Some(current.rev.as_str()) {
            return Err(GatewayError::Conflict);
        }

        let candidate = Document::tombstone(id);
        let old_doc = current.to_document();
        let permit = match self.authorizer.authorize(&candidate, Some(&old_doc), actor) {
            Ok(permit) => permit,
            Err(rejection) => {
                tracing::info!(doc_id = %id, user = actor.label(), reason = %rejection, "delete_rejected");
                return Err(rejection.into());
            }
        };

        let mut body = candidate.into_body();
        body.remove("_id");
        let outcome = self
            .store
            .save(DocumentWrite {
                id: id.to_string(),
                expected_rev: Some(current.rev.clone()),
                body,
                deleted: true,
                // Subscribers of the old channels still need to see the deletion
                channels: permit.channels.unwrap_or(current.channels),
            })
            .await?;
        match outcome {
            SaveOutcome::Saved { rev, sequence } => {
                tracing::info!(doc_id = %id, user = actor.label(), %rev, sequence, "document_deleted");
                Ok(WriteResult {
                    id: id.to_string(),
                    rev,
                })
            }
            SaveOutcome::Conflict => Err(GatewayError::Conflict),
        }
    }
}

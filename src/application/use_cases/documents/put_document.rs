use serde_json::{Map, Value};

use crate::application::access::{Actor, WriteAuthorizer};
use crate::application::ports::document_store::{
    DocumentStore, DocumentWrite, SaveOutcome, revision_matches,
};
use crate::application::use_cases::documents::error::GatewayError;
use crate::domain::documents::document::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub id: String,
    pub rev: String,
}

pub struct PutDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
    pub authorizer: &'a WriteAuthorizer,
}

impl<'a, S: DocumentStore + ?Sized> PutDocument<'a, S> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: &str,
        body: Map<String, Value>,
    ) -> Result<WriteResult, GatewayError> {
        let current = self.store.get(id).await?;

        // The URL names the document; a conflicting `_id` in the body is overridden
        let mut candidate = Document::new(body);
        candidate.set("_id", Value::String(id.to_string()));
        let expected_rev = candidate.rev().map(str::to_string);
        if !revision_matches(current.as_ref(), expected_rev.as_deref()) {
            return Err(GatewayError::Conflict);
        }
        // `_deleted` is the wire marker; the policy looks at `deleted`
        if matches!(candidate.field("_deleted"), Some(Value::Bool(true))) {
            candidate.set("deleted", Value::Bool(true));
        }
        let deleted = candidate.is_tombstone();

        let old_doc = current
            .as_ref()
            .filter(|c| !c.deleted)
            .map(|c| c.to_document());
        let permit = match self
            .authorizer
            .authorize(&candidate, old_doc.as_ref(), actor)
        {
            Ok(permit) => permit,
            Err(rejection) => {
                tracing::info!(doc_id = %id, user = actor.label(), reason = %rejection, "write_rejected");
                return Err(rejection.into());
            }
        };

        let channels = permit
            .channels
            .or_else(|| current.as_ref().map(|c| c.channels.clone()))
            .unwrap_or_default();
        let mut body = candidate.into_body();
        body.remove("_id");
        body.remove("_rev");
        body.remove("_deleted");

        let outcome = self
            .store
            .save(DocumentWrite {
                id: id.to_string(),
                expected_rev,
                body,
                deleted,
                channels,
            })
            .await?;
        match outcome {
            SaveOutcome::Saved { rev, sequence } => {
                tracing::info!(doc_id = %id, user = actor.label(), %rev, sequence, "document_saved");
                Ok(WriteResult {
                    id: id.to_string(),
                    rev,
                })
            }
            SaveOutcome::Conflict => Err(GatewayError::Conflict),
        }
    }
}

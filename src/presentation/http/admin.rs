use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

use crate::application::access::Actor;
use crate::application::use_cases::documents::error::GatewayError;
use crate::application::use_cases::documents::get_raw_document::GetRawDocument;
use crate::application::use_cases::documents::purge_documents::PurgeDocuments;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::documents::check_keyspace;
use crate::presentation::http::error::ErrorBody;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResponse {
    pub purged: BTreeMap<String, Vec<String>>,
}

#[utoipa::path(post, path = "/{keyspace}/_purge", tag = "Admin",
    params(("keyspace" = String, Path, description = "db or db.scope.collection")),
    responses((status = 200, body = PurgeResponse), (status = 400, body = ErrorBody)))]
pub async fn purge(
    State(ctx): State<AppContext>,
    _admin: Actor,
    Path(keyspace): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<PurgeResponse>, GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    // Only whole-document purges (`["*"]`) are supported
    for (id, revs) in &body {
        if revs != &json!(["*"]) {
            return Err(GatewayError::BadRequest(format!(
                "Purge of individual revisions is not supported ({})",
                id
            )));
        }
    }
    let ids: Vec<String> = body.keys().cloned().collect();
    let store = ctx.document_store();
    let uc = PurgeDocuments {
        store: store.as_ref(),
    };
    let purged = uc
        .execute(&ids)
        .await?
        .into_iter()
        .map(|id| (id, vec!["*".to_string()]))
        .collect();
    Ok(Json(PurgeResponse { purged }))
}

#[utoipa::path(get, path = "/{keyspace}/_raw/{docid}", tag = "Admin",
    params(
        ("keyspace" = String, Path, description = "db or db.scope.collection"),
        ("docid" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Stored body with _sync metadata"),
        (status = 404, body = ErrorBody)
    ))]
pub async fn get_raw(
    State(ctx): State<AppContext>,
    _admin: Actor,
    Path((keyspace, docid)): Path<(String, String)>,
) -> Result<Json<Value>, GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    let store = ctx.document_store();
    let uc = GetRawDocument {
        store: store.as_ref(),
    };
    let doc = uc.execute(&docid).await?;
    let mut body = doc.body.clone();
    body.insert(
        "_sync".to_string(),
        json!({
            "rev": doc.rev,
            "sequence": doc.sequence,
            "channels": doc.channels,
            "deleted": doc.deleted,
            "time_saved": doc.saved_at.to_rfc3339(),
        }),
    );
    Ok(Json(Value::Object(body)))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::access::Actor;
use crate::application::use_cases::documents::delete_document::DeleteDocument;
use crate::application::use_cases::documents::error::GatewayError;
use crate::application::use_cases::documents::get_document::GetDocument;
use crate::application::use_cases::documents::list_changes::ListChanges;
use crate::application::use_cases::documents::put_document::{PutDocument, WriteResult};
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::channels::ChannelSet;
use crate::presentation::http::error::ErrorBody;

pub const BY_CHANNEL_FILTER: &str = "sync_gateway/bychannel";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WriteResponse {
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

impl From<WriteResult> for WriteResponse {
    fn from(r: WriteResult) -> Self {
        Self {
            ok: true,
            id: r.id,
            rev: r.rev,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevRef {
    pub rev: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRow {
    pub seq: u64,
    pub id: String,
    pub changes: Vec<RevRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangesResponse {
    pub results: Vec<ChangeRow>,
    pub last_seq: u64,
}

#[derive(Debug, Deserialize)]
pub struct RevQuery {
    pub rev: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    pub since: Option<u64>,
    pub filter: Option<String>,
    pub channels: Option<String>,
}

pub(crate) fn check_keyspace(ctx: &AppContext, keyspace: &str) -> Result<(), GatewayError> {
    if ctx.cfg.serves_keyspace(keyspace) {
        Ok(())
    } else {
        Err(GatewayError::NotFound)
    }
}

#[utoipa::path(get, path = "/{keyspace}/{docid}", tag = "Documents",
    params(
        ("keyspace" = String, Path, description = "db or db.scope.collection"),
        ("docid" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document body with _id and _rev"),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn get_document(
    State(ctx): State<AppContext>,
    actor: Actor,
    Path((keyspace, docid)): Path<(String, String)>,
) -> Result<Json<Value>, GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    let store = ctx.document_store();
    let uc = GetDocument {
        store: store.as_ref(),
    };
    Ok(Json(uc.execute(&actor, &docid).await?))
}

#[utoipa::path(put, path = "/{keyspace}/{docid}", tag = "Documents",
    params(
        ("keyspace" = String, Path, description = "db or db.scope.collection"),
        ("docid" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 201, body = WriteResponse),
        (status = 403, description = "Rejected by the write policy", body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn put_document(
    State(ctx): State<AppContext>,
    actor: Actor,
    Path((keyspace, docid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<WriteResponse>), GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    let Value::Object(body) = body else {
        return Err(GatewayError::BadRequest(
            "Document body must be a JSON object".into(),
        ));
    };
    let store = ctx.document_store();
    let uc = PutDocument {
        store: store.as_ref(),
        authorizer: ctx.authorizer(),
    };
    let result = uc.execute(&actor, &docid, body).await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

#[utoipa::path(delete, path = "/{keyspace}/{docid}", tag = "Documents",
    params(
        ("keyspace" = String, Path, description = "db or db.scope.collection"),
        ("docid" = String, Path, description = "Document ID"),
        ("rev" = Option<String>, Query, description = "Current revision")
    ),
    responses(
        (status = 200, body = WriteResponse),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 409, body = ErrorBody)
    ))]
pub async fn delete_document(
    State(ctx): State<AppContext>,
    actor: Actor,
    Path((keyspace, docid)): Path<(String, String)>,
    Query(q): Query<RevQuery>,
) -> Result<Json<WriteResponse>, GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    let store = ctx.document_store();
    let uc = DeleteDocument {
        store: store.as_ref(),
        authorizer: ctx.authorizer(),
    };
    let result = uc.execute(&actor, &docid, q.rev.as_deref()).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(get, path = "/{keyspace}/_changes", tag = "Documents",
    params(
        ("keyspace" = String, Path, description = "db or db.scope.collection"),
        ("since" = Option<u64>, Query, description = "Only changes after this sequence"),
        ("filter" = Option<String>, Query, description = "sync_gateway/bychannel"),
        ("channels" = Option<String>, Query, description = "Comma separated channels for the bychannel filter")
    ),
    responses((status = 200, body = ChangesResponse), (status = 400, body = ErrorBody)))]
pub async fn changes(
    State(ctx): State<AppContext>,
    actor: Actor,
    Path(keyspace): Path<String>,
    Query(q): Query<ChangesQuery>,
) -> Result<Json<ChangesResponse>, GatewayError> {
    check_keyspace(&ctx, &keyspace)?;
    let only = match q.filter.as_deref() {
        None => None,
        Some(BY_CHANNEL_FILTER) => {
            let raw = q.channels.as_deref().unwrap_or("");
            let set = ChannelSet::parse_list(raw);
            if set.is_empty() {
                return Err(GatewayError::BadRequest(
                    "Missing 'channels' filter parameter".into(),
                ));
            }
            Some(set)
        }
        Some(_) => {
            return Err(GatewayError::BadRequest(format!(
                "Unknown filter; try {}",
                BY_CHANNEL_FILTER
            )));
        }
    };

    let store = ctx.document_store();
    let uc = ListChanges {
        store: store.as_ref(),
    };
    let feed = uc.execute(&actor, q.since.unwrap_or(0), only.as_ref()).await?;
    let results = feed
        .results
        .into_iter()
        .map(|c| ChangeRow {
            seq: c.sequence,
            id: c.id,
            changes: vec![RevRef { rev: c.rev }],
            deleted: c.deleted.then_some(true),
        })
        .collect();
    Ok(Json(ChangesResponse {
        results,
        last_seq: feed.last_seq,
    }))
}

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::bootstrap::app_context::AppContext;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
    pub last_seq: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/_health",
    tag = "Health",
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResp> {
    let last_seq = ctx.document_store().last_sequence().await.ok();
    let status = if last_seq.is_some() { "ok" } else { "degraded" };
    Json(HealthResp { status, last_seq })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/_health", get(health)).with_state(ctx)
}

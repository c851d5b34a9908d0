use axum::extract::MatchedPath;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::application::access::Actor;
use crate::bootstrap::app_context::AppContext;

pub mod admin;
pub mod auth;
pub mod documents;
pub mod error;
pub mod health;

#[derive(OpenApi)]
#[openapi(
    paths(
        documents::get_document,
        documents::put_document,
        documents::delete_document,
        documents::changes,
        admin::purge,
        admin::get_raw,
        health::health,
    ),
    components(schemas(
        documents::WriteResponse,
        documents::RevRef,
        documents::ChangeRow,
        documents::ChangesResponse,
        admin::PurgeResponse,
        error::ErrorBody,
        health::HealthResp,
    )),
    tags(
        (name = "Documents", description = "Document reads, policy-checked writes and the changes feed"),
        (name = "Admin", description = "Admin-only maintenance endpoints"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;

async fn openapi_json(_admin: Actor) -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn with_tracing(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
            let method = req.method().clone();
            let uri = req.uri().clone();
            let matched = req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            tracing::info_span!("http", %method, %uri, matched_path = %matched)
        }),
    )
}

/// Router for the public listener: document routes resolve an `Actor` from
/// the configured users.
pub fn public_app(ctx: AppContext) -> Router {
    let router = Router::new()
        .route("/:keyspace/_changes", get(documents::changes))
        .route(
            "/:keyspace/:docid",
            get(documents::get_document)
                .put(documents::put_document)
                .delete(documents::delete_document),
        )
        .with_state(ctx.clone());
    with_tracing(router.merge(health::routes(ctx)))
}

/// Router for the admin listener: role requirements are waived, writes are
/// still validated.
pub fn admin_app(ctx: AppContext) -> Router {
    let ctx = ctx.for_admin();
    let router = Router::new()
        .route("/:keyspace/_changes", get(documents::changes))
        .route("/:keyspace/_purge", post(admin::purge))
        .route("/:keyspace/_raw/:docid", get(admin::get_raw))
        .route(
            "/:keyspace/:docid",
            get(documents::get_document)
                .put(documents::put_document)
                .delete(documents::delete_document),
        )
        .route("/_openapi.json", get(openapi_json))
        .with_state(ctx.clone());
    with_tracing(router.merge(health::routes(ctx)))
}

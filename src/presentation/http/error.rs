use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::documents::error::GatewayError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub reason: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            GatewayError::Forbidden(_) | GatewayError::NoChannelAccess => {
                (StatusCode::FORBIDDEN, "forbidden")
            }
            GatewayError::Conflict => (StatusCode::CONFLICT, "conflict"),
            GatewayError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            GatewayError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        let reason = match &self {
            GatewayError::Store(e) => {
                tracing::error!(error = ?e, "document_store_failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };
        (
            status,
            Json(ErrorBody {
                error: error.to_string(),
                reason,
            }),
        )
            .into_response()
    }
}

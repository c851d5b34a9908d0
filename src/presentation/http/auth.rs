use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::application::access::Actor;
use crate::bootstrap::app_context::{AppContext, Listener};
use crate::presentation::http::error::ErrorBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub name: String,
    pub password: String,
}

/// `Authorization: Basic base64(name:password)`
pub fn parse_basic(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // Passwords may contain ':'; names may not
    let (name, password) = decoded.split_once(':')?;
    Some(BasicCredentials {
        name: name.to_string(),
        password: password.to_string(),
    })
}

fn unauthorized() -> Response {
    let mut res = (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: "Unauthorized".into(),
            reason: "Login required".into(),
        }),
    )
        .into_response();
    res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"syncgate\""),
    );
    res
}

/// Resolves the caller from Basic credentials.
///
/// On the public listener the credentials must name a configured user. On
/// the admin listener they must match the admin account, or may be omitted
/// when no admin user is configured.
#[axum::async_trait]
impl FromRequestParts<AppContext> for Actor {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let creds = parse_basic(&parts.headers);
        match ctx.listener {
            Listener::Admin => resolve_admin(ctx, creds),
            Listener::Public => resolve_user(ctx, creds).await,
        }
    }
}

async fn resolve_user(ctx: &AppContext, creds: Option<BasicCredentials>) -> Result<Actor, Response> {
    let creds = creds.ok_or_else(unauthorized)?;
    match ctx
        .user_directory()
        .authenticate(&creds.name, &creds.password)
        .await
    {
        Ok(Some(p)) => Ok(Actor::User(p)),
        Ok(None) => {
            tracing::debug!(user = %creds.name, "login_failed");
            Err(unauthorized())
        }
        Err(e) => {
            tracing::error!(error = ?e, "user_directory_failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

fn resolve_admin(ctx: &AppContext, creds: Option<BasicCredentials>) -> Result<Actor, Response> {
    let Some(admin_user) = ctx.cfg.admin_user.as_deref() else {
        return Ok(Actor::Admin);
    };
    let expected_password = ctx.cfg.admin_password.as_deref().unwrap_or("");
    match creds {
        Some(c) if c.name == admin_user && c.password == expected_password => Ok(Actor::Admin),
        _ => Err(unauthorized()),
    }
}

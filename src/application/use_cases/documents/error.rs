use crate::application::access::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Forbidden(#[from] Rejection),
    #[error("You are not allowed to see this")]
    NoChannelAccess,
    #[error("Document revision conflict")]
    Conflict,
    #[error("missing")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

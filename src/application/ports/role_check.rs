use crate::application::access::Rejection;

/// Caller capability consulted by the write authorizer.
pub trait RoleCheck {
    /// Fails unless the caller holds at least one of `roles`.
    fn require_role(&self, roles: &[String]) -> Result<(), Rejection>;
}

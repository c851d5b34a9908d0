use async_trait::async_trait;

use crate::application::access::Principal;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the principal when the name and password match a configured user.
    async fn authenticate(&self, name: &str, password: &str) -> anyhow::Result<Option<Principal>>;
}

use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::access::Principal;
use crate::application::ports::user_directory::UserDirectory;
use crate::domain::users::user::UserAccount;

/// Users loaded once at startup from configuration.
pub struct StaticUserDirectory {
    users: HashMap<String, UserAccount>,
}

impl StaticUserDirectory {
    pub fn new(accounts: Vec<UserAccount>) -> Self {
        let users = accounts.into_iter().map(|u| (u.name.clone(), u)).collect();
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn authenticate(&self, name: &str, password: &str) -> anyhow::Result<Option<Principal>> {
        let Some(user) = self.users.get(name) else {
            return Ok(None);
        };
        if user.password != password {
            return Ok(None);
        }
        Ok(Some(Principal {
            name: user.name.clone(),
            roles: user.roles.iter().cloned().collect(),
            channels: user.channels.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::channels::ChannelSet;

    #[tokio::test]
    async fn authenticates_by_name_and_password() {
        let dir = StaticUserDirectory::new(vec![UserAccount {
            name: "bob".into(),
            password: "12345".into(),
            roles: vec!["user".into()],
            channels: ChannelSet::from_names(["bob"]),
        }]);

        let p = dir.authenticate("bob", "12345").await.unwrap().unwrap();
        assert!(p.roles.contains("user"));
        assert!(p.channels.contains("bob"));
        assert!(dir.authenticate("bob", "wrong").await.unwrap().is_none());
        assert!(dir.authenticate("alice", "12345").await.unwrap().is_none());
    }
}

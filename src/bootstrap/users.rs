use anyhow::Context;

use crate::domain::users::user::UserAccount;

/// Reads the users file: a JSON array of `{name, password, roles, channels}`.
pub fn load_users(path: &str) -> anyhow::Result<Vec<UserAccount>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read users file at {}", path))?;
    let users: Vec<UserAccount> =
        serde_json::from_str(&raw).with_context(|| format!("parse users file at {}", path))?;
    if let Some(dup) = first_duplicate(&users) {
        anyhow::bail!("duplicate user '{}' in {}", dup, path);
    }
    Ok(users)
}

fn first_duplicate(users: &[UserAccount]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    users
        .iter()
        .map(|u| u.name.as_str())
        .find(|name| !seen.insert(*name))
}

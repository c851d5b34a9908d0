use std::env;

use anyhow::Context;

use crate::domain::policy::SyncPolicy;

pub const DEFAULT_SCOPE: &str = "_default";
pub const DEFAULT_COLLECTION: &str = "_default";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub admin_port: u16,
    pub database: String,
    pub scope: String,
    pub collection: String,
    pub policy: SyncPolicy,
    pub users_file: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub is_production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 4984,
            admin_port: 4985,
            database: "sync_gateway".into(),
            scope: DEFAULT_SCOPE.into(),
            collection: DEFAULT_COLLECTION.into(),
            policy: SyncPolicy::default(),
            users_file: None,
            admin_user: None,
            admin_password: None,
            is_production: false,
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.api_port);
        let admin_port = env::var("ADMIN_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.admin_port);
        let database = non_empty("SYNC_DB").unwrap_or(defaults.database);
        let scope = non_empty("SYNC_SCOPE").unwrap_or(defaults.scope);
        let collection = non_empty("SYNC_COLLECTION").unwrap_or(defaults.collection);

        // A policy file wins over a named preset
        let policy = match non_empty("SYNC_POLICY_FILE") {
            Some(path) => load_policy(&path)?,
            None => {
                let name = non_empty("SYNC_POLICY")
                    .unwrap_or_else(|| SyncPolicy::SYNC_FUNCTION_RUN.to_string());
                SyncPolicy::preset(&name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "SYNC_POLICY must be one of {}, {} (got {})",
                        SyncPolicy::BASIC_SECURITY,
                        SyncPolicy::SYNC_FUNCTION_RUN,
                        name
                    )
                })?
            }
        };

        let users_file = non_empty("USERS_FILE");
        let admin_user = non_empty("ADMIN_USER");
        let admin_password = non_empty("ADMIN_PASSWORD");
        let is_production = matches!(
            env::var("RUST_ENV").ok().as_deref(),
            Some("production") | Some("prod")
        );

        // Production hardening: the admin listener must not be open
        if is_production {
            if admin_user.is_none() {
                anyhow::bail!("ADMIN_USER must be set in production");
            }
            if admin_password.as_deref().map(str::len).unwrap_or(0) < 12 {
                anyhow::bail!("ADMIN_PASSWORD must be set to a strong secret in production");
            }
        }

        Ok(Self {
            api_port,
            admin_port,
            database,
            scope,
            collection,
            policy,
            users_file,
            admin_user,
            admin_password,
            is_production,
        })
    }

    /// `db` for the default collection, `db.scope.collection` otherwise.
    pub fn keyspace(&self) -> String {
        if self.scope == DEFAULT_SCOPE && self.collection == DEFAULT_COLLECTION {
            self.database.clone()
        } else {
            format!("{}.{}.{}", self.database, self.scope, self.collection)
        }
    }

    pub fn serves_keyspace(&self, keyspace: &str) -> bool {
        keyspace == self.keyspace()
            || keyspace == format!("{}.{}.{}", self.database, self.scope, self.collection)
    }
}

pub fn load_policy(path: &str) -> anyhow::Result<SyncPolicy> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read sync policy at {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse sync policy at {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_collection_collapses_to_database() {
        let cfg = Config::default();
        assert_eq!(cfg.keyspace(), "sync_gateway");
        assert!(cfg.serves_keyspace("sync_gateway"));
        assert!(cfg.serves_keyspace("sync_gateway._default._default"));
        assert!(!cfg.serves_keyspace("other"));
    }

    #[test]
    fn named_collection_keyspace() {
        let cfg = Config {
            scope: "inventory".into(),
            collection: "orders".into(),
            ..Config::default()
        };
        assert_eq!(cfg.keyspace(), "sync_gateway.inventory.orders");
        assert!(!cfg.serves_keyspace("sync_gateway"));
    }

    #[test]
    fn policy_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let policy = SyncPolicy::basic_security();
        write!(file, "{}", serde_json::to_string(&policy).unwrap()).unwrap();
        let loaded = load_policy(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded, policy);
    }

    #[test]
    fn missing_policy_file_names_path() {
        let err = load_policy("/nonexistent/policy.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policy.json"));
    }
}

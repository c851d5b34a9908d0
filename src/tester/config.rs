use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer};

/// Tester configuration file. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TesterConfig {
    pub sg_host: String,
    #[serde(deserialize_with = "port")]
    pub sg_port: String,
    #[serde(deserialize_with = "port")]
    pub sg_admin_port: String,
    pub sg_db: String,
    pub sg_db_scope: String,
    pub sg_db_collection: String,
    pub sg_test_users: Vec<TestUser>,
    pub sg_admin_user: String,
    pub sg_admin_password: String,
    pub log_path_to_write_to: String,
    pub json_folder: String,
    pub debug: bool,
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUser {
    pub user_name: String,
    pub password: String,
    #[serde(default)]
    pub sg_session: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            sg_host: "http://localhost".into(),
            sg_port: "4984".into(),
            sg_admin_port: "4985".into(),
            sg_db: "sync_gateway".into(),
            sg_db_scope: "_default".into(),
            sg_db_collection: "_default".into(),
            sg_test_users: vec![TestUser {
                user_name: "bob".into(),
                password: "12345".into(),
                sg_session: String::new(),
            }],
            sg_admin_user: String::new(),
            sg_admin_password: String::new(),
            log_path_to_write_to: "sync_gateway_log".into(),
            json_folder: "jsons".into(),
            debug: false,
            operations: Vec::new(),
        }
    }
}

// Ports show up both as "4984" and 4984 in existing config files
fn port<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u16),
    }
    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}

impl TesterConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                anyhow::bail!("Configuration file '{}' not found.", path.display())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read configuration file '{}'", path.display()));
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("Configuration file '{}' is not valid JSON.", path.display()))
    }

    /// `db` for the default collection, `db.scope.collection` otherwise.
    pub fn keyspace(&self) -> String {
        if self.sg_db_scope == "_default" && self.sg_db_collection == "_default" {
            self.sg_db.clone()
        } else {
            format!("{}.{}.{}", self.sg_db, self.sg_db_scope, self.sg_db_collection)
        }
    }

    pub fn base_url(&self, admin: bool) -> String {
        let port = if admin {
            &self.sg_admin_port
        } else {
            &self.sg_port
        };
        format!("{}:{}", self.sg_host.trim_end_matches('/'), port)
    }
}

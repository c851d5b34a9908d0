use serde::{Deserialize, Serialize};

use crate::domain::documents::document::DocType;

/// Parameters of the per-write authorization rules.
///
/// Two deployments of the same rules are known; they differ only in the
/// identifier delimiter, the role sets, how malformed identifiers are
/// reported and the wording of the unknown-type error. Both are available
/// as presets and any other combination can be loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub name: String,
    pub id_delimiter: char,
    /// Reject a missing or non-string `_id` as a malformed identifier
    /// instead of as an unknown document type.
    #[serde(default)]
    pub id_parse_strict: bool,
    pub deletion_roles: Vec<String>,
    pub order_roles: Vec<String>,
    pub job_roles: Vec<String>,
    pub unknown_type_message: String,
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl SyncPolicy {
    pub const BASIC_SECURITY: &'static str = "basic-security";
    pub const SYNC_FUNCTION_RUN: &'static str = "sync-function-run";

    /// `order:1` style identifiers, lenient ID parsing.
    pub fn basic_security() -> Self {
        Self {
            name: Self::BASIC_SECURITY.to_string(),
            id_delimiter: ':',
            id_parse_strict: false,
            deletion_roles: roles(&["editor", "admin"]),
            order_roles: roles(&["editor", "admin", "user"]),
            job_roles: roles(&["editor", "admin"]),
            unknown_type_message: "error: no docType".to_string(),
        }
    }

    /// `order-1` style identifiers, strict ID parsing, managers may write jobs.
    pub fn sync_function_run() -> Self {
        Self {
            name: Self::SYNC_FUNCTION_RUN.to_string(),
            id_delimiter: '-',
            id_parse_strict: true,
            deletion_roles: roles(&["editor", "admin"]),
            order_roles: roles(&["editor", "admin", "user"]),
            job_roles: roles(&["manager", "editor", "admin"]),
            unknown_type_message: "error: invalid docType".to_string(),
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim() {
            Self::BASIC_SECURITY => Some(Self::basic_security()),
            Self::SYNC_FUNCTION_RUN => Some(Self::sync_function_run()),
            _ => None,
        }
    }

    pub fn roles_for(&self, doc_type: DocType) -> &[String] {
        match doc_type {
            DocType::Order => &self.order_roles,
            DocType::Job => &self.job_roles,
        }
    }
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self::sync_function_run()
    }
}

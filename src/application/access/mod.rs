use std::collections::BTreeSet;

use serde_json::Value;

use crate::application::ports::role_check::RoleCheck;
use crate::domain::documents::channels::ChannelSet;
use crate::domain::documents::document::{DocType, Document};
use crate::domain::policy::SyncPolicy;

/// Authenticated, non-admin caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub roles: BTreeSet<String>,
    pub channels: ChannelSet,
}

impl Principal {
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(Principal),
    // Admin listener; role requirements always pass
    Admin,
}

impl Actor {
    pub fn label(&self) -> &str {
        match self {
            Actor::User(p) => &p.name,
            Actor::Admin => "admin",
        }
    }

    /// Whether the caller may see a document assigned to `channels`.
    pub fn can_read(&self, channels: &ChannelSet) -> bool {
        match self {
            Actor::Admin => true,
            Actor::User(p) => p.channels.grants_all() || p.channels.intersects(channels),
        }
    }
}

impl RoleCheck for Actor {
    fn require_role(&self, roles: &[String]) -> Result<(), Rejection> {
        match self {
            Actor::Admin => Ok(()),
            Actor::User(p) if p.has_any_role(roles) => Ok(()),
            Actor::User(_) => Err(Rejection::MissingRole {
                required: roles.to_vec(),
            }),
        }
    }
}

/// Why a write was refused. Every variant is terminal for the write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("error: invalid document ID format")]
    InvalidIdFormat,
    #[error("{0}")]
    UnknownDocType(String),
    #[error("missing role")]
    MissingRole { required: Vec<String> },
    #[error("error: field '{0}' has errors")]
    FieldErrors(String),
}

/// A permitted write. `channels` is `None` when channel assignment was
/// skipped, which leaves the document's existing membership untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit {
    pub channels: Option<ChannelSet>,
}

/// Per-write validation and channel assignment.
#[derive(Debug, Clone, Default)]
pub struct WriteAuthorizer {
    policy: SyncPolicy,
}

impl WriteAuthorizer {
    pub fn new(policy: SyncPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Decides whether `doc` may be written by `caller`.
    ///
    /// Checks run in a fixed order: identifier, then role, then the
    /// `channels` field, so a caller without the role never learns about
    /// field errors. `old_doc` is accepted for parity with the host
    /// contract; the current rules do not compare revisions.
    pub fn authorize<C>(
        &self,
        doc: &Document,
        _old_doc: Option<&Document>,
        caller: &C,
    ) -> Result<Permit, Rejection>
    where
        C: RoleCheck + ?Sized,
    {
        let doc_type = self.resolve_doc_type(doc)?;

        if doc.is_tombstone() {
            caller.require_role(&self.policy.deletion_roles)?;
            tracing::debug!(id = ?doc.id_str(), "tombstone_permitted");
            return Ok(Permit { channels: None });
        }

        let Some(doc_type) = doc_type else {
            return Err(Rejection::UnknownDocType(
                self.policy.unknown_type_message.clone(),
            ));
        };

        caller.require_role(self.policy.roles_for(doc_type))?;
        let value = field_check(doc.channels())?;
        let channels = ChannelSet::from_value(value);
        tracing::debug!(
            id = ?doc.id_str(),
            doc_type = doc_type.as_str(),
            channels = ?channels,
            "write_permitted"
        );
        Ok(Permit {
            channels: Some(channels),
        })
    }

    // Ok(None) => identifier parsed but its first segment is not a known type
    fn resolve_doc_type(&self, doc: &Document) -> Result<Option<DocType>, Rejection> {
        match doc.id() {
            Some(Value::String(id)) => Ok(id
                .split(self.policy.id_delimiter)
                .next()
                .and_then(DocType::from_segment)),
            _ if self.policy.id_parse_strict => Err(Rejection::InvalidIdFormat),
            _ => Err(Rejection::UnknownDocType(
                self.policy.unknown_type_message.clone(),
            )),
        }
    }
}

/// A usable `channels` value is present, not null, not `""` and not a number.
pub fn is_valid_channel_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Number(_)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn field_check(value: Option<&Value>) -> Result<&Value, Rejection> {
    match value {
        Some(v) if is_valid_channel_value(value) => Ok(v),
        _ => Err(Rejection::FieldErrors(render_field_value(value))),
    }
}

/// Renders a field value the way a script string concatenation would,
/// so rejection reasons read the same as the gateway's native ones.
pub fn render_field_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(v) => render_value(v, false),
    }
}

// Exponent form outside [1e-6, 1e21), with an explicit `+` on positive
// exponents; negative zero prints as "0". Display already drops a zero
// fraction (42.0 => "42").
fn render_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let exp = format!("{:e}", f);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

fn render_value(value: &Value, nested: bool) -> String {
    match value {
        Value::Null if nested => String::new(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(render_float).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, true))
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(roles: &[&str]) -> Actor {
        Actor::User(Principal {
            name: "bob".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            channels: ChannelSet::from_names(["bob"]),
        })
    }

    fn doc(v: Value) -> Document {
        Document::from_value(v).unwrap()
    }

    fn basic() -> WriteAuthorizer {
        WriteAuthorizer::new(SyncPolicy::basic_security())
    }

    fn run() -> WriteAuthorizer {
        WriteAuthorizer::new(SyncPolicy::sync_function_run())
    }

    #[test]
    fn order_with_user_role_is_assigned_its_channel() {
        let permit = run()
            .authorize(
                &doc(json!({"_id": "order-1", "channels": "public", "deleted": false})),
                None,
                &user(&["user"]),
            )
            .unwrap();
        assert_eq!(permit.channels, Some(ChannelSet::from_names(["public"])));
    }

    #[test]
    fn numeric_channels_are_reported_with_their_value() {
        let err = basic()
            .authorize(&doc(json!({"_id": "job:7", "channels": 42})), None, &user(&["admin"]))
            .unwrap_err();
        assert_eq!(err, Rejection::FieldErrors("42".into()));
        assert_eq!(err.to_string(), "error: field '42' has errors");
    }

    #[test]
    fn unknown_type_uses_policy_message() {
        for roles in [&["admin"][..], &["user"][..], &[][..]] {
            let err = run()
                .authorize(&doc(json!({"_id": "widget-1"})), None, &user(roles))
                .unwrap_err();
            assert_eq!(err.to_string(), "error: invalid docType");
        }
        let err = basic()
            .authorize(&doc(json!({"_id": "widget:1"})), None, &Actor::Admin)
            .unwrap_err();
        assert_eq!(err.to_string(), "error: no docType");
    }

    #[test]
    fn tombstone_skips_channel_validation() {
        let permit = basic()
            .authorize(&doc(json!({"_id": "order:5", "deleted": true})), None, &user(&["admin"]))
            .unwrap();
        assert_eq!(permit.channels, None);

        // Even a bogus channels value and an unknown type are ignored
        let permit = run()
            .authorize(
                &doc(json!({"_id": "widget-1", "deleted": true, "channels": 7})),
                None,
                &user(&["editor"]),
            )
            .unwrap();
        assert_eq!(permit.channels, None);
    }

    #[test]
    fn tombstone_requires_deletion_role() {
        let err = run()
            .authorize(&doc(json!({"_id": "order-1", "deleted": true})), None, &user(&["user"]))
            .unwrap_err();
        assert!(matches!(err, Rejection::MissingRole { .. }));
    }

    #[test]
    fn role_check_precedes_field_check() {
        let err = basic()
            .authorize(&doc(json!({"_id": "job:1", "channels": null})), None, &user(&["user"]))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::MissingRole {
                required: vec!["editor".into(), "admin".into()]
            }
        );
    }

    #[test]
    fn managers_may_write_jobs_only_under_strict_policy() {
        let d = doc(json!({"_id": "job-1", "channels": ["ops"]}));
        assert!(run().authorize(&d, None, &user(&["manager"])).is_ok());
        let d = doc(json!({"_id": "job:1", "channels": ["ops"]}));
        assert!(basic().authorize(&d, None, &user(&["manager"])).is_err());
    }

    #[test]
    fn missing_identifier_depends_on_strictness() {
        let d = doc(json!({"channels": "public"}));
        assert_eq!(
            run().authorize(&d, None, &Actor::Admin).unwrap_err(),
            Rejection::InvalidIdFormat
        );
        assert_eq!(
            basic().authorize(&d, None, &Actor::Admin).unwrap_err(),
            Rejection::UnknownDocType("error: no docType".into())
        );

        // Identifier check runs before the tombstone branch
        let d = doc(json!({"_id": 12, "deleted": true}));
        assert_eq!(
            run().authorize(&d, None, &Actor::Admin).unwrap_err(),
            Rejection::InvalidIdFormat
        );
    }

    #[test]
    fn identifier_without_delimiter_is_its_own_type() {
        let d = doc(json!({"_id": "order", "channels": "c"}));
        assert!(basic().authorize(&d, None, &user(&["user"])).is_ok());
        let d = doc(json!({"_id": "order:1", "channels": "c"}));
        // "order:1" has no '-' so its type is "order:1"
        assert_eq!(
            run().authorize(&d, None, &user(&["user"])).unwrap_err().to_string(),
            "error: invalid docType"
        );
    }

    #[test]
    fn channel_value_predicate() {
        assert!(!is_valid_channel_value(None));
        assert!(!is_valid_channel_value(Some(&Value::Null)));
        assert!(!is_valid_channel_value(Some(&json!(""))));
        assert!(!is_valid_channel_value(Some(&json!(0))));
        assert!(!is_valid_channel_value(Some(&json!(1.5))));
        assert!(is_valid_channel_value(Some(&json!("public"))));
        assert!(is_valid_channel_value(Some(&json!([]))));
        assert!(is_valid_channel_value(Some(&json!(false))));
        assert!(is_valid_channel_value(Some(&json!({}))));
    }

    #[test]
    fn field_values_render_like_concatenation() {
        assert_eq!(render_field_value(None), "undefined");
        assert_eq!(render_field_value(Some(&Value::Null)), "null");
        assert_eq!(render_field_value(Some(&json!(""))), "");
        assert_eq!(render_field_value(Some(&json!(42.0))), "42");
        assert_eq!(render_field_value(Some(&json!(4.5))), "4.5");
        assert_eq!(render_field_value(Some(&json!(["a", null, 1]))), "a,,1");
        assert_eq!(render_field_value(Some(&json!({"a": 1}))), "[object Object]");
    }

    #[test]
    fn read_access_follows_channels() {
        let bob = user(&["user"]);
        assert!(bob.can_read(&ChannelSet::from_names(["bob", "x"])));
        assert!(!bob.can_read(&ChannelSet::from_names(["public"])));
        assert!(!bob.can_read(&ChannelSet::new()));
        assert!(Actor::Admin.can_read(&ChannelSet::new()));
    }

    #[test]
    fn floats_render_like_script_numbers() {
        assert_eq!(render_field_value(Some(&json!(1e21))), "1e+21");
        assert_eq!(render_field_value(Some(&json!(1.5e300))), "1.5e+300");
        assert_eq!(render_field_value(Some(&json!(1.5e-7))), "1.5e-7");
        assert_eq!(render_field_value(Some(&json!(-0.0))), "0");
        assert_eq!(render_field_value(Some(&json!(4.5))), "4.5");
        assert_eq!(render_field_value(Some(&json!(42.0))), "42");
        assert_eq!(render_field_value(Some(&json!(0.000001))), "0.000001");
    }

    #[test]
    fn exponent_channels_are_reported_in_script_form() {
        let err = WriteAuthorizer::new(SyncPolicy::basic_security())
            .authorize(&doc(json!({"_id": "order:1", "channels": 1e21})), None, &user(&["user"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "error: field '1e+21' has errors");
    }
}

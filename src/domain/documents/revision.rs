use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Generation number of a `<generation>-<digest>` revision ID.
pub fn generation(rev: &str) -> Option<u64> {
    rev.split_once('-').and_then(|(g, _)| g.parse().ok())
}

/// Revision ID for a new write on top of `parent`.
///
/// The digest covers the parent revision, the deletion flag and the body,
/// so identical writes on the same parent produce the same ID.
pub fn next_revision(parent: Option<&str>, body: &Map<String, Value>, deleted: bool) -> String {
    let next_gen = parent.and_then(generation).unwrap_or(0) + 1;
    let mut hasher = Sha256::new();
    hasher.update(parent.unwrap_or("").as_bytes());
    hasher.update([u8::from(deleted)]);
    // serde_json::Map is ordered by key, so serialization is canonical
    hasher.update(Value::Object(body.clone()).to_string().as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", next_gen, hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn generation_increments_from_parent() {
        let first = next_revision(None, &body(json!({"a": 1})), false);
        assert_eq!(generation(&first), Some(1));
        let second = next_revision(Some(&first), &body(json!({"a": 2})), false);
        assert_eq!(generation(&second), Some(2));
        assert_eq!(second.len(), "2-".len() + 32);
    }

    #[test]
    fn digest_depends_on_content_and_deletion() {
        let b = body(json!({"channels": "public"}));
        assert_eq!(next_revision(None, &b, false), next_revision(None, &b, false));
        assert_ne!(next_revision(None, &b, false), next_revision(None, &b, true));
        assert_ne!(
            next_revision(None, &b, false),
            next_revision(None, &body(json!({"channels": "private"})), false)
        );
    }

    #[test]
    fn malformed_revisions_have_no_generation() {
        assert_eq!(generation("abc"), None);
        assert_eq!(generation("x-abc"), None);
    }
}

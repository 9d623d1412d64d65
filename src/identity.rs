//! Identity assignment for segments prior to persistence.
//!
//! Every persisted node must carry a unique value under the store's
//! configured identity property. Callers may pre-populate that property
//! (e.g. with a document id); the assigner keeps the caller's value visible
//! as a prefix while still guaranteeing uniqueness with a fresh token.
//! Without this disambiguation, reusing an id across documents trips the
//! store's uniqueness constraint at write time.

use serde_json::Value;
use uuid::Uuid;

use crate::document::Segment;

/// Assign a unique identity value to `segment.metadata[id_property]`.
///
/// The value is composed of up to three `_`-joined parts, in order:
/// the owning parent's id (children only), the caller-supplied value
/// already present under `id_property` (if any), and a fresh random token.
///
/// Returns the assigned value.
///
/// # Example
///
/// ```rust,ignore
/// // segment.metadata["id"] == "doc-ai"
/// let value = assign_identity(&mut segment, "id", Some("parent_2"));
/// assert!(value.starts_with("parent_2_doc-ai_"));
/// ```
pub fn assign_identity(segment: &mut Segment, id_property: &str, parent_id: Option<&str>) -> String {
    let token = Uuid::new_v4().to_string();

    let existing = segment.metadata.get(id_property).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });

    let mut parts: Vec<String> = Vec::with_capacity(3);
    if let Some(parent) = parent_id {
        parts.push(parent.to_string());
    }
    if let Some(existing) = existing {
        parts.push(existing);
    }
    parts.push(token);

    let value = parts.join("_");
    segment.metadata.insert(id_property.to_string(), Value::String(value.clone()));
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_segment_gets_fresh_token() {
        let mut segment = Segment::new("text");
        let value = assign_identity(&mut segment, "id", None);
        assert!(!value.is_empty());
        assert_eq!(segment.metadata["id"], value);
    }

    #[test]
    fn caller_id_is_kept_as_prefix() {
        let mut segment = Segment::new("text");
        segment.metadata.insert("id".into(), "doc-ai".into());
        let value = assign_identity(&mut segment, "id", None);
        assert!(value.starts_with("doc-ai_"));
        assert_ne!(value, "doc-ai");
    }

    #[test]
    fn parent_scope_comes_first() {
        let mut segment = Segment::new("text");
        segment.metadata.insert("id".into(), "doc-ai".into());
        let value = assign_identity(&mut segment, "id", Some("parent_2"));
        assert!(value.starts_with("parent_2_doc-ai_"));
        // a fresh token follows the two prefixes
        assert!(value.len() > "parent_2_doc-ai_".len());
    }

    #[test]
    fn two_assignments_never_collide() {
        let mut a = Segment::new("a");
        let mut b = Segment::new("b");
        let va = assign_identity(&mut a, "id", Some("parent_0"));
        let vb = assign_identity(&mut b, "id", Some("parent_0"));
        assert_ne!(va, vb);
    }
}

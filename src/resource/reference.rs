//! Sub-resource references
//!
//! A [`SubResource`] is the wire form of a pointer to another resource or to a
//! sibling child inside the same aggregate: `{"id": "..."}`. The id may point
//! at something that does not exist yet.

use super::id::{leaf_name_from_id, parent_id_from_child_id, same_name, ReferenceError};
use serde::{Deserialize, Serialize};

/// Reference to a resource by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Name of the referenced resource (last id segment)
    pub fn name(&self) -> Result<&str, ReferenceError> {
        leaf_name_from_id(&self.id)
    }

    /// Id of the resource owning the referenced child
    pub fn parent_id(&self) -> Result<&str, ReferenceError> {
        parent_id_from_child_id(&self.id)
    }

    /// Whether this reference names `name`, compared case-insensitively.
    /// Malformed ids never match.
    pub fn points_to(&self, name: &str) -> bool {
        self.name()
            .map(|n| same_name(n, name))
            .unwrap_or(false)
    }
}

impl From<&str> for SubResource {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubResource {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Add a reference to a list unless one with the same id is already present.
///
/// Ids are compared case-insensitively. Returns `true` if the list changed.
pub fn add_unique(refs: &mut Option<Vec<SubResource>>, reference: SubResource) -> bool {
    let list = refs.get_or_insert_with(Vec::new);
    if list.iter().any(|r| same_name(&r.id, &reference.id)) {
        return false;
    }
    list.push(reference);
    true
}

/// Remove every reference whose leaf name is `name`.
///
/// An emptied list is reset to `None` so it is omitted from the wire.
pub fn remove_by_name(refs: &mut Option<Vec<SubResource>>, name: &str) -> bool {
    let Some(list) = refs.as_mut() else {
        return false;
    };

    let before = list.len();
    list.retain(|r| !r.points_to(name));
    let changed = list.len() != before;

    if list.is_empty() {
        *refs = None;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &str = "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/loadBalancers/lb/backendAddressPools/Pool1";

    #[test]
    fn test_name_and_parent() {
        let r = SubResource::new(POOL);
        assert_eq!(r.name().unwrap(), "Pool1");
        assert!(r.parent_id().unwrap().ends_with("/loadBalancers/lb"));
    }

    #[test]
    fn test_points_to_is_case_insensitive() {
        let r = SubResource::new(POOL);
        assert!(r.points_to("pool1"));
        assert!(!r.points_to("pool2"));
        assert!(!SubResource::new("").points_to(""));
    }

    #[test]
    fn test_points_to_folds_like_collection_keys() {
        let r = SubResource::new(format!("{}/Ärger", POOL));
        assert!(r.points_to("ärger"));
        assert!(r.points_to("ÄRGER"));
        assert!(!r.points_to("arger"));
    }

    #[test]
    fn test_wire_format() {
        let r = SubResource::new("/a/b");
        assert_eq!(serde_json::to_value(&r).unwrap(), serde_json::json!({"id": "/a/b"}));
    }

    #[test]
    fn test_add_unique() {
        let mut refs = None;
        assert!(add_unique(&mut refs, SubResource::new(POOL)));
        assert!(!add_unique(&mut refs, SubResource::new(POOL.to_uppercase())));
        assert_eq!(refs.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_remove_by_name_clears_empty_list() {
        let mut refs = Some(vec![SubResource::new(POOL)]);
        assert!(remove_by_name(&mut refs, "POOL1"));
        assert!(refs.is_none());
        assert!(!remove_by_name(&mut refs, "pool1"));
    }
}

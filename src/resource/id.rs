//! Resource identifiers
//!
//! ARM identifies every resource and sub-resource by a slash-delimited path of
//! alternating `{type}/{name}` segments:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{group}/providers/Microsoft.Network/applicationGateways/{gw}/backendAddressPools/{pool}
//! ```
//!
//! The free functions here work on plain strings and are what child references
//! are built and resolved with. They accept "future" ids, i.e. paths of parents
//! that have not been created server-side yet. [`ResourceId`] is the structured,
//! fully validated form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path separator used in resource ids
pub const SEPARATOR: char = '/';

/// Minimum number of segments a child id must have to yield a parent id
pub const MIN_CHILD_SEGMENTS: usize = 4;

/// Errors raised while building or parsing resource ids
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("resource id is empty")]
    Empty,

    #[error("resource id '{id}' contains an empty path segment")]
    EmptySegment { id: String },

    #[error("resource id '{id}' has {count} segments, at least {min} are required")]
    TooFewSegments { id: String, count: usize, min: usize },

    #[error("resource id '{id}' has an odd number of segments")]
    UnpairedSegment { id: String },

    #[error("{what} must not be empty")]
    EmptyComponent { what: &'static str },

    #[error("{what} '{value}' must not contain '/'")]
    SlashInComponent { what: &'static str, value: String },
}

/// Split an id into its non-empty segments.
///
/// Leading and trailing separators are ignored; an empty segment anywhere in
/// between is an error.
fn segments(id: &str) -> Result<Vec<&str>, ReferenceError> {
    let trimmed = id.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Err(ReferenceError::Empty);
    }

    let parts: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ReferenceError::EmptySegment { id: id.to_string() });
    }

    Ok(parts)
}

fn check_component(what: &'static str, value: &str) -> Result<(), ReferenceError> {
    if value.is_empty() {
        return Err(ReferenceError::EmptyComponent { what });
    }
    if value.contains(SEPARATOR) {
        return Err(ReferenceError::SlashInComponent {
            what,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Build the id of a child resource from its parent's id.
///
/// The parent id may be a future id. Only emptiness and embedded separators are
/// checked; no other character validation is performed.
///
/// # Examples
/// ```
/// use tarm::resource::build_child_id;
/// let id = build_child_id("/subscriptions/s/resourceGroups/g", "providers", "x").unwrap();
/// assert_eq!(id, "/subscriptions/s/resourceGroups/g/providers/x");
/// ```
pub fn build_child_id(
    parent_id: &str,
    child_type: &str,
    child_name: &str,
) -> Result<String, ReferenceError> {
    if parent_id.trim_matches(SEPARATOR).is_empty() {
        return Err(ReferenceError::EmptyComponent { what: "parent id" });
    }
    check_component("child type", child_type)?;
    check_component("child name", child_name)?;

    Ok(format!(
        "{}{SEPARATOR}{child_type}{SEPARATOR}{child_name}",
        parent_id.trim_end_matches(SEPARATOR)
    ))
}

/// Drop the trailing `{type}/{name}` pair of a child id.
///
/// The returned slice keeps whatever leading separator the input had.
pub fn parent_id_from_child_id(child_id: &str) -> Result<&str, ReferenceError> {
    let parts = segments(child_id)?;
    if parts.len() < MIN_CHILD_SEGMENTS {
        return Err(ReferenceError::TooFewSegments {
            id: child_id.to_string(),
            count: parts.len(),
            min: MIN_CHILD_SEGMENTS,
        });
    }

    let trimmed = child_id.trim_end_matches(SEPARATOR);
    trimmed
        .rsplitn(3, SEPARATOR)
        .nth(2)
        .ok_or_else(|| ReferenceError::TooFewSegments {
            id: child_id.to_string(),
            count: parts.len(),
            min: MIN_CHILD_SEGMENTS,
        })
}

/// Case folding applied to every child name and id comparison
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Whether two names (or ids) are equal after [`fold_name`]
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || fold_name(a) == fold_name(b)
}

/// Return the last segment of an id, i.e. the resource's name.
pub fn leaf_name_from_id(id: &str) -> Result<&str, ReferenceError> {
    let parts = segments(id)?;
    parts.last().copied().ok_or(ReferenceError::Empty)
}

/// Return the type segment that precedes the leaf name.
pub fn leaf_type_from_id(id: &str) -> Result<&str, ReferenceError> {
    let parts = segments(id)?;
    if parts.len() < 2 {
        return Err(ReferenceError::TooFewSegments {
            id: id.to_string(),
            count: parts.len(),
            min: 2,
        });
    }
    Ok(parts[parts.len() - 2])
}

/// A parsed, validated ARM resource id.
///
/// Segments are stored as `(type, name)` pairs. The `providers/{namespace}`
/// pair is kept like any other pair; accessors skip over it where needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    pairs: Vec<(String, String)>,
}

impl ResourceId {
    /// Parse an id, enforcing the even-segment invariant.
    pub fn parse(id: &str) -> Result<Self, ReferenceError> {
        let parts = segments(id)?;
        if parts.len() % 2 != 0 {
            return Err(ReferenceError::UnpairedSegment { id: id.to_string() });
        }

        let pairs = parts
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();

        Ok(Self { pairs })
    }

    /// Synthesize the id a top-level resource will have once created.
    pub fn future(
        subscription_id: &str,
        resource_group: &str,
        provider: &str,
        resource_type: &str,
        name: &str,
    ) -> Result<Self, ReferenceError> {
        check_component("subscription id", subscription_id)?;
        check_component("resource group", resource_group)?;
        check_component("provider namespace", provider)?;
        check_component("resource type", resource_type)?;
        check_component("resource name", name)?;

        Ok(Self {
            pairs: vec![
                ("subscriptions".to_string(), subscription_id.to_string()),
                ("resourceGroups".to_string(), resource_group.to_string()),
                ("providers".to_string(), provider.to_string()),
                (resource_type.to_string(), name.to_string()),
            ],
        })
    }

    /// Id of a child of this resource.
    pub fn child(&self, child_type: &str, child_name: &str) -> Result<Self, ReferenceError> {
        check_component("child type", child_type)?;
        check_component("child name", child_name)?;
        let mut pairs = self.pairs.clone();
        pairs.push((child_type.to_string(), child_name.to_string()));
        Ok(Self { pairs })
    }

    fn value_of(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Index of the first pair after `providers/{namespace}`
    fn resource_start(&self) -> Option<usize> {
        self.pairs
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case("providers"))
            .map(|idx| idx + 1)
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.value_of("subscriptions")
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        self.value_of("resourceGroups")
    }

    pub fn provider_namespace(&self) -> Option<&str> {
        self.value_of("providers")
    }

    /// Leaf type segment, e.g. `backendAddressPools`
    pub fn resource_type(&self) -> &str {
        self.pairs.last().map(|(k, _)| k.as_str()).unwrap_or_default()
    }

    /// Namespace-qualified type, e.g. `Microsoft.Network/applicationGateways/backendAddressPools`
    pub fn full_resource_type(&self) -> Option<String> {
        let namespace = self.provider_namespace()?;
        let start = self.resource_start()?;
        if start >= self.pairs.len() {
            return None;
        }
        let types: Vec<&str> = self.pairs[start..].iter().map(|(k, _)| k.as_str()).collect();
        Some(format!("{}/{}", namespace, types.join("/")))
    }

    pub fn name(&self) -> &str {
        self.pairs.last().map(|(_, v)| v.as_str()).unwrap_or_default()
    }

    /// The owning resource, if this id names a child below a provider resource.
    pub fn parent(&self) -> Option<Self> {
        let start = self.resource_start()?;
        if self.pairs.len() <= start + 1 {
            return None;
        }
        Some(Self {
            pairs: self.pairs[..self.pairs.len() - 1].to_vec(),
        })
    }

    pub fn is_child(&self) -> bool {
        self.parent().is_some()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.pairs {
            write!(f, "{SEPARATOR}{k}{SEPARATOR}{v}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourceId {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GW: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/applicationGateways/gw1";

    #[test]
    fn test_build_child_id() {
        let id = build_child_id(GW, "backendAddressPools", "pool1").unwrap();
        assert_eq!(id, format!("{GW}/backendAddressPools/pool1"));
    }

    #[test]
    fn test_build_child_id_trims_trailing_separator() {
        let id = build_child_id(&format!("{GW}/"), "probes", "p").unwrap();
        assert_eq!(id, format!("{GW}/probes/p"));
    }

    #[test]
    fn test_build_child_id_rejects_empty_and_slashes() {
        assert_eq!(
            build_child_id("", "probes", "p"),
            Err(ReferenceError::EmptyComponent { what: "parent id" })
        );
        assert_eq!(
            build_child_id(GW, "", "p"),
            Err(ReferenceError::EmptyComponent { what: "child type" })
        );
        assert_eq!(
            build_child_id(GW, "probes", ""),
            Err(ReferenceError::EmptyComponent { what: "child name" })
        );
        assert!(matches!(
            build_child_id(GW, "probes", "a/b"),
            Err(ReferenceError::SlashInComponent { .. })
        ));
    }

    #[test]
    fn test_parent_id_from_child_id() {
        let child = format!("{GW}/backendAddressPools/pool1");
        assert_eq!(parent_id_from_child_id(&child).unwrap(), GW);
        assert_eq!(parent_id_from_child_id("a/b/c/d").unwrap(), "a/b");
        assert_eq!(parent_id_from_child_id("/a/b/c/d/").unwrap(), "/a/b");
    }

    #[test]
    fn test_parent_id_requires_four_segments() {
        assert!(matches!(
            parent_id_from_child_id("/a/b/c"),
            Err(ReferenceError::TooFewSegments { count: 3, .. })
        ));
        assert_eq!(parent_id_from_child_id(""), Err(ReferenceError::Empty));
        assert!(matches!(
            parent_id_from_child_id("/a//b/c/d"),
            Err(ReferenceError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_leaf_name_from_id() {
        assert_eq!(leaf_name_from_id(GW).unwrap(), "gw1");
        assert_eq!(leaf_name_from_id("single").unwrap(), "single");
        assert_eq!(leaf_name_from_id("/x/y/").unwrap(), "y");
        assert_eq!(leaf_name_from_id(""), Err(ReferenceError::Empty));
        assert_eq!(leaf_name_from_id("///"), Err(ReferenceError::Empty));
    }

    #[test]
    fn test_leaf_type_from_id() {
        assert_eq!(leaf_type_from_id(GW).unwrap(), "applicationGateways");
        assert!(leaf_type_from_id("name").is_err());
    }

    #[test]
    fn test_resource_id_accessors() {
        let id = ResourceId::parse(&format!("{GW}/backendAddressPools/pool1")).unwrap();
        assert_eq!(id.subscription_id(), Some("sub1"));
        assert_eq!(id.resource_group_name(), Some("rg1"));
        assert_eq!(id.provider_namespace(), Some("Microsoft.Network"));
        assert_eq!(id.resource_type(), "backendAddressPools");
        assert_eq!(id.name(), "pool1");
        assert_eq!(
            id.full_resource_type().as_deref(),
            Some("Microsoft.Network/applicationGateways/backendAddressPools")
        );
        assert_eq!(id.parent().unwrap().to_string(), GW);
        assert!(id.is_child());
    }

    #[test]
    fn test_resource_id_keys_case_insensitive() {
        let id = ResourceId::parse("/SUBSCRIPTIONS/s/resourcegroups/g/Providers/Microsoft.Network/virtualNetworks/vnet").unwrap();
        assert_eq!(id.subscription_id(), Some("s"));
        assert_eq!(id.resource_group_name(), Some("g"));
        assert_eq!(id.provider_namespace(), Some("Microsoft.Network"));
        assert!(!id.is_child());
    }

    #[test]
    fn test_resource_id_rejects_odd_segments() {
        assert!(matches!(
            ResourceId::parse("/subscriptions/s/resourceGroups"),
            Err(ReferenceError::UnpairedSegment { .. })
        ));
    }

    #[test]
    fn test_future_id_matches_string_builder() {
        let future = ResourceId::future("sub1", "rg1", "Microsoft.Network", "applicationGateways", "gw1").unwrap();
        assert_eq!(future.to_string(), GW);

        let child = future.child("probes", "p1").unwrap();
        assert_eq!(child.to_string(), build_child_id(GW, "probes", "p1").unwrap());
    }

    #[test]
    fn test_resource_id_serde_as_string() {
        let id = ResourceId::parse(GW).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{GW}\""));
        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ResourceId>("\"/a/b/c\"").is_err());
    }
}

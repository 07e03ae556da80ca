//! Top-level resources and their wire envelope
//!
//! An [`Aggregate`] owns an ARM resource envelope ([`ResourceInner`]) and one
//! [`DeferredCollection`](super::DeferredCollection) per child type. Child
//! arrays are taken out of the envelope when an aggregate is built and only
//! written back by [`Aggregate::to_wire`], right before submission.

use super::id::{build_child_id, ResourceId};
use super::reference::SubResource;
use super::registry::{get_resource, ResourceDef};
use super::ChildProperties;
use crate::error::{NetworkError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a top-level resource lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl ResourceScope {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Scope of an existing resource, taken from its id
    pub fn from_id(id: &ResourceId) -> Option<Self> {
        Some(Self::new(
            id.subscription_id()?,
            id.resource_group_name()?,
            id.name(),
        ))
    }
}

/// ARM envelope shared by every top-level resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInner<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub properties: P,
}

/// A top-level resource owning deferred child collections
pub trait Aggregate: Sized {
    type Properties: Clone + Default + Serialize + DeserializeOwned;

    /// Registry key of this kind
    const KIND: &'static str;
    /// Human-readable label used in errors and logs
    const DISPLAY: &'static str;

    /// Build from an envelope, moving its child arrays into collections.
    fn from_parts(scope: ResourceScope, inner: ResourceInner<Self::Properties>) -> Self;

    fn scope(&self) -> &ResourceScope;

    /// The envelope; child arrays are `None` here while they live in collections.
    fn inner(&self) -> &ResourceInner<Self::Properties>;

    fn inner_mut(&mut self) -> &mut ResourceInner<Self::Properties>;

    /// Clear intra-resource references whose target child is absent.
    /// Returns the number of references cleared.
    fn clean_dangling_references(&mut self) -> usize;

    /// Write every child collection into `properties`.
    fn collect_children(&self, properties: &mut Self::Properties);

    /// Check fields the service requires on create.
    fn validate(&self) -> Result<()> {
        if self.inner().location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("{} '{}'", Self::DISPLAY, self.name())
    }

    fn name(&self) -> &str {
        &self.scope().name
    }

    fn resource_group_name(&self) -> &str {
        &self.scope().resource_group
    }

    /// Server-assigned id; `None` until created or fetched
    fn id(&self) -> Option<&str> {
        self.inner().id.as_deref()
    }

    fn region_name(&self) -> Option<&str> {
        self.inner().location.as_deref()
    }

    fn tags(&self) -> &BTreeMap<String, String> {
        &self.inner().tags
    }

    fn kind_def() -> Result<&'static ResourceDef> {
        get_resource(Self::KIND).ok_or_else(|| NetworkError::UnknownKind(Self::KIND.to_string()))
    }

    /// Id this resource has, or will have once created
    fn future_id(&self) -> Result<String> {
        if let Some(id) = self.id() {
            return Ok(id.to_string());
        }
        let def = Self::kind_def()?;
        let scope = self.scope();
        let id = ResourceId::future(
            &scope.subscription_id,
            &scope.resource_group,
            &def.provider,
            &def.resource_type,
            &scope.name,
        )?;
        Ok(id.to_string())
    }

    /// Reference to a sibling child of type `Q`, whether or not it exists yet
    fn reference_to<Q: ChildProperties>(&self, name: &str) -> Result<SubResource> {
        let id = build_child_id(&self.future_id()?, Q::TYPE_SEGMENT, name)?;
        Ok(SubResource::new(id))
    }

    /// Replace the envelope with a fetched one, rebuilding every collection.
    /// Children attached but never submitted are discarded.
    fn set_inner(&mut self, inner: ResourceInner<Self::Properties>) {
        *self = Self::from_parts(self.scope().clone(), inner);
    }

    /// Repair references, validate, and produce the envelope to submit.
    fn to_wire(&mut self) -> Result<ResourceInner<Self::Properties>> {
        let cleared = self.clean_dangling_references();
        if cleared > 0 {
            tracing::debug!("{}: cleared {} dangling reference(s)", self.label(), cleared);
        }
        self.validate()?;

        let mut wire = self.inner().clone();
        wire.name = Some(self.name().to_string());
        self.collect_children(&mut wire.properties);
        Ok(wire)
    }

    fn with_region(&mut self, location: &str) -> &mut Self {
        self.inner_mut().location = Some(location.to_string());
        self
    }

    fn with_tag(&mut self, key: &str, value: &str) -> &mut Self {
        self.inner_mut().tags.insert(key.to_string(), value.to_string());
        self
    }

    fn without_tag(&mut self, key: &str) -> &mut Self {
        self.inner_mut().tags.remove(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{has_children, DeferredCollection};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TableProps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        routes: Option<Vec<crate::resource::Child<RouteProps>>>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct RouteProps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<SubResource>,
    }

    impl ChildProperties for RouteProps {
        const TYPE_SEGMENT: &'static str = "routes";
        const KIND: &'static str = "route";
    }

    struct Table {
        scope: ResourceScope,
        inner: ResourceInner<TableProps>,
        routes: DeferredCollection<RouteProps>,
    }

    has_children!(Table { routes: RouteProps });

    impl Aggregate for Table {
        type Properties = TableProps;
        const KIND: &'static str = "route-tables";
        const DISPLAY: &'static str = "route table";

        fn from_parts(scope: ResourceScope, mut inner: ResourceInner<TableProps>) -> Self {
            let routes = DeferredCollection::from_wire(inner.properties.routes.take());
            Self { scope, inner, routes }
        }

        fn scope(&self) -> &ResourceScope {
            &self.scope
        }

        fn inner(&self) -> &ResourceInner<TableProps> {
            &self.inner
        }

        fn inner_mut(&mut self) -> &mut ResourceInner<TableProps> {
            &mut self.inner
        }

        fn clean_dangling_references(&mut self) -> usize {
            let snapshot = self.routes.clone();
            self.routes
                .iter_mut()
                .map(|r| snapshot.clear_dangling(&mut r.properties.next) as usize)
                .sum()
        }

        fn collect_children(&self, properties: &mut TableProps) {
            properties.routes = Some(self.routes.to_wire());
        }
    }

    fn table() -> Table {
        Table::from_parts(ResourceScope::new("sub", "rg", "rt"), ResourceInner::default())
    }

    #[test]
    fn test_future_id_and_reference() {
        let t = table();
        assert_eq!(
            t.future_id().unwrap(),
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/routeTables/rt"
        );
        let r = t.reference_to::<RouteProps>("r1").unwrap();
        assert!(r.id.ends_with("/routeTables/rt/routes/r1"));
    }

    #[test]
    fn test_future_id_prefers_server_id() {
        let mut t = table();
        t.inner.id = Some("/subscriptions/x/resourceGroups/y/providers/Microsoft.Network/routeTables/rt".into());
        assert!(t.future_id().unwrap().starts_with("/subscriptions/x/"));
    }

    #[test]
    fn test_to_wire_requires_location() {
        let mut t = table();
        let err = t.to_wire().unwrap_err();
        assert!(matches!(err, NetworkError::MissingField { field: "location", .. }));
    }

    #[test]
    fn test_to_wire_cleans_and_collects() {
        let mut t = table();
        t.with_region("westus").with_tag("env", "dev");
        let dangling = t.reference_to::<RouteProps>("missing").unwrap();
        crate::resource::ChildBuilder::<_, RouteProps>::define(&mut t, "r1")
            .configure(|p| p.next = Some(dangling))
            .attach();

        let wire = t.to_wire().unwrap();
        let routes = wire.properties.routes.unwrap();
        assert_eq!(routes.len(), 1);
        assert!(routes[0].properties.next.is_none());
        assert_eq!(wire.name.as_deref(), Some("rt"));
        assert_eq!(wire.tags.get("env").map(String::as_str), Some("dev"));
    }

    #[test]
    fn test_set_inner_discards_unsubmitted_children() {
        let mut t = table();
        crate::resource::ChildBuilder::<_, RouteProps>::define(&mut t, "staged").attach();
        t.set_inner(ResourceInner {
            location: Some("eastus".into()),
            properties: TableProps {
                routes: Some(vec![crate::resource::Child::new("persisted")]),
            },
            ..Default::default()
        });
        assert!(!t.routes.contains("staged"));
        assert!(t.routes.contains("persisted"));
        assert!(t.inner.properties.routes.is_none());
        assert_eq!(t.region_name(), Some("eastus"));
    }
}

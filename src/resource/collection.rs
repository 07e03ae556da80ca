//! Deferred child collections
//!
//! Every aggregate keeps its named children (backend pools, probes, rules, ...)
//! in a [`DeferredCollection`]. Children are defined through a [`ChildBuilder`]
//! that borrows the aggregate; nothing reaches the collection until the builder
//! is attached, and nothing reaches the wire until the aggregate is submitted.
//!
//! # Lifecycle of a child
//!
//! ```text
//! define(name) --> builder (detached) --attach()--> collection --submit--> rebuilt from response
//! ```
//!
//! A builder that is dropped without `attach()` leaves no trace. Rebuilding from
//! a fetched wire representation discards every child that was attached but not
//! yet submitted.
//!
//! # Names
//!
//! Child names are case-preserving and compared case-insensitively everywhere:
//! lookups, attach, removal, and reference resolution.

use super::id::{fold_name, leaf_name_from_id, ReferenceError};
use super::reference::SubResource;
use crate::error::NetworkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire properties of one kind of child resource
pub trait ChildProperties: Clone + Default + Serialize + DeserializeOwned {
    /// Path segment naming this child type inside its parent's id
    const TYPE_SEGMENT: &'static str;
    /// Human-readable label used in errors and logs
    const KIND: &'static str;
}

/// A named child resource as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: P,
}

impl<P: ChildProperties> Child<P> {
    /// A fresh child carrying the default properties of its kind
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            etag: None,
            resource_type: None,
            properties: P::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Server-assigned id; `None` until the parent has been submitted
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }
}

fn key(name: &str) -> String {
    fold_name(name)
}

/// Whether a builder was handed a fresh child or a copy of an attached one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Define,
    Update,
}

/// Name-keyed set of children owned by one aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredCollection<P> {
    children: BTreeMap<String, Child<P>>,
}

impl<P> Default for DeferredCollection<P> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }
}

impl<P: ChildProperties> DeferredCollection<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a fetched wire list
    pub fn from_wire(items: Option<Vec<Child<P>>>) -> Self {
        let mut collection = Self::new();
        collection.rebuild_from_wire(items);
        collection
    }

    pub fn get(&self, name: &str) -> Option<&Child<P>> {
        self.children.get(&key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Child<P>> {
        self.children.get_mut(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(&key(name))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Child<P>> {
        self.children.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Child<P>> {
        self.children.values_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.values().map(|c| c.name.as_str())
    }

    /// Starting point of a definition: a copy of the attached child with this
    /// name, or a fresh one.
    pub fn stage(&self, name: &str) -> (Child<P>, BuildMode) {
        match self.get(name) {
            Some(existing) => (existing.clone(), BuildMode::Update),
            None => (Child::new(name), BuildMode::Define),
        }
    }

    /// Insert a child, replacing any child of the same name.
    pub fn attach(&mut self, child: Child<P>) -> Option<Child<P>> {
        let replaced = self.children.insert(key(&child.name), child);
        if let Some(old) = &replaced {
            tracing::debug!("{} '{}' replaced", P::KIND, old.name);
        }
        replaced
    }

    /// Remove a child; absent names are ignored.
    pub fn remove(&mut self, name: &str) -> Option<Child<P>> {
        self.children.remove(&key(name))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Child<P>) -> bool) {
        self.children.retain(|_, child| keep(child));
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Look up the child a reference id points at.
    ///
    /// A well-formed id naming an unknown child yields `Ok(None)`; only a
    /// malformed id is an error.
    pub fn resolve_reference(&self, reference_id: &str) -> Result<Option<&Child<P>>, ReferenceError> {
        let name = leaf_name_from_id(reference_id)?;
        Ok(self.get(name))
    }

    pub fn resolve(&self, reference: &SubResource) -> Result<Option<&Child<P>>, ReferenceError> {
        self.resolve_reference(&reference.id)
    }

    /// Replace the whole collection with a freshly fetched wire list.
    pub fn rebuild_from_wire(&mut self, items: Option<Vec<Child<P>>>) {
        self.children.clear();
        for item in items.unwrap_or_default() {
            if item.name.is_empty() {
                tracing::warn!("Skipping unnamed {} in wire representation", P::KIND);
                continue;
            }
            self.children.insert(key(&item.name), item);
        }
    }

    /// Children in collection order, ready to be placed in the parent's wire model
    pub fn to_wire(&self) -> Vec<Child<P>> {
        self.children.values().cloned().collect()
    }

    /// Clear `reference` if it does not resolve to a child of this collection.
    ///
    /// Malformed ids count as dangling. Returns `true` if the reference was cleared.
    pub fn clear_dangling(&self, reference: &mut Option<SubResource>) -> bool {
        let dangling = match reference.as_ref() {
            Some(r) => !matches!(self.resolve(r), Ok(Some(_))),
            None => false,
        };

        if dangling {
            if let Some(r) = reference.take() {
                tracing::debug!("Cleared dangling {} reference {}", P::KIND, r.id);
            }
        }
        dangling
    }

    /// Drop every reference in `refs` that does not resolve here.
    ///
    /// An emptied list is reset to `None`. Returns the number of references dropped.
    pub fn retain_resolvable(&self, refs: &mut Option<Vec<SubResource>>) -> usize {
        let Some(list) = refs.as_mut() else {
            return 0;
        };

        let before = list.len();
        list.retain(|r| matches!(self.resolve(r), Ok(Some(_))));
        let dropped = before - list.len();

        if dropped > 0 {
            tracing::debug!("Dropped {} dangling {} reference(s)", dropped, P::KIND);
        }
        if list.is_empty() {
            *refs = None;
        }
        dropped
    }
}

/// Aggregates expose each of their collections through this trait so a
/// [`ChildBuilder`] can find where to attach.
pub trait HasChildren<P: ChildProperties> {
    fn children(&self) -> &DeferredCollection<P>;
    fn children_mut(&mut self) -> &mut DeferredCollection<P>;
}

/// Implement [`HasChildren`] for each `field: Properties` pair of an aggregate.
macro_rules! has_children {
    ($aggregate:ty { $($field:ident: $props:ty),+ $(,)? }) => {
        $(
            impl $crate::resource::HasChildren<$props> for $aggregate {
                fn children(&self) -> &$crate::resource::DeferredCollection<$props> {
                    &self.$field
                }

                fn children_mut(&mut self) -> &mut $crate::resource::DeferredCollection<$props> {
                    &mut self.$field
                }
            }
        )+
    };
}
pub(crate) use has_children;

/// Fluent definition of one child, borrowing its parent until attached
#[must_use = "a child definition has no effect until attach() is called"]
pub struct ChildBuilder<'a, A, P> {
    parent: &'a mut A,
    child: Child<P>,
    mode: BuildMode,
}

impl<'a, A, P> ChildBuilder<'a, A, P>
where
    A: HasChildren<P>,
    P: ChildProperties,
{
    /// Begin defining `name`, starting from the attached child if there is one.
    pub fn define(parent: &'a mut A, name: &str) -> Self {
        let (child, mode) = parent.children().stage(name);
        Self {
            parent,
            child,
            mode,
        }
    }

    /// Begin updating an attached child; fails if there is none by that name.
    pub fn update(parent: &'a mut A, name: &str) -> Result<Self, NetworkError> {
        let Some(child) = parent.children().get(name).cloned() else {
            return Err(NetworkError::ChildNotFound {
                kind: P::KIND,
                name: name.to_string(),
            });
        };
        Ok(Self {
            parent,
            child,
            mode: BuildMode::Update,
        })
    }

    pub fn name(&self) -> &str {
        &self.child.name
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// The child as it will be attached
    pub fn child(&self) -> &Child<P> {
        &self.child
    }

    pub fn parent(&self) -> &A {
        self.parent
    }

    pub(crate) fn parent_mut(&mut self) -> &mut A {
        self.parent
    }

    pub(crate) fn properties_mut(&mut self) -> &mut P {
        &mut self.child.properties
    }

    /// Edit properties that have no dedicated setter.
    pub fn configure(mut self, edit: impl FnOnce(&mut P)) -> Self {
        edit(&mut self.child.properties);
        self
    }

    /// Insert the child into its parent's collection and return the parent.
    pub fn attach(self) -> &'a mut A {
        let Self {
            parent,
            child,
            mode,
        } = self;
        tracing::debug!("Attaching {} '{}' ({:?})", P::KIND, child.name, mode);
        parent.children_mut().attach(child);
        parent
    }
}

//! Resource abstraction layer
//!
//! Everything that is independent of a particular network resource kind:
//!
//! - [`id`] - Resource id construction and parsing
//! - [`reference`] - `{"id": ...}` references between resources
//! - [`collection`] - Deferred child collections and child builders
//! - [`parent`] - The [`Aggregate`] trait and the ARM envelope
//! - [`registry`] - Resource kind definitions loaded from embedded JSON
//! - [`fetcher`] - The [`Transport`] seam and lifecycle verbs
//!
//! # Example
//!
//! ```
//! use tarm::resource::{build_child_id, leaf_name_from_id, parent_id_from_child_id};
//!
//! let gw = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/applicationGateways/gw";
//! let pool = build_child_id(gw, "backendAddressPools", "pool1").unwrap();
//! assert_eq!(leaf_name_from_id(&pool).unwrap(), "pool1");
//! assert_eq!(parent_id_from_child_id(&pool).unwrap(), gw);
//! ```

pub mod collection;
pub mod fetcher;
pub mod id;
pub mod parent;
pub mod reference;
mod registry;

pub(crate) use collection::has_children;
pub use collection::{BuildMode, Child, ChildBuilder, ChildProperties, DeferredCollection, HasChildren};
pub use fetcher::{extract_json_value, fetch_resources, Page, Transport};
pub use id::{
    build_child_id, fold_name, leaf_name_from_id, leaf_type_from_id, parent_id_from_child_id,
    same_name, ReferenceError, ResourceId,
};
pub use parent::{Aggregate, ResourceInner, ResourceScope};
pub use reference::SubResource;
pub use registry::*;

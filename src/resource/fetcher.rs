//! Resource Fetcher
//!
//! The [`Transport`] seam and the lifecycle verbs built on it: fetch, list
//! (following `nextLink` pagination), create-or-update, refresh, and delete.
//! Every verb works on any [`Aggregate`], decoding and encoding its ARM
//! envelope through serde.

use super::id::ResourceId;
use super::parent::{Aggregate, ResourceInner, ResourceScope};
use super::registry::ResourceDef;
use crate::error::{NetworkError, Result};
use futures::future::BoxFuture;
use serde_json::Value;

/// One page of a list response
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_link: Option<String>,
}

impl Page {
    /// Read an ARM list body: `{"value": [...], "nextLink": "..."}`
    pub fn from_response(response: &Value) -> Self {
        let items = response
            .get("value")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let next_link = response
            .get("nextLink")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Self { items, next_link }
    }
}

/// Access to the management endpoint for one subscription
pub trait Transport: Send + Sync {
    fn subscription_id(&self) -> &str;

    fn get<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Value>>;

    fn put<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
        body: Value,
    ) -> BoxFuture<'a, anyhow::Result<Value>>;

    fn delete<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Fetch one page; `next_link` is the link returned by the previous page.
    fn list_page<'a>(
        &'a self,
        def: &'a ResourceDef,
        resource_group: &'a str,
        next_link: Option<&'a str>,
    ) -> BoxFuture<'a, anyhow::Result<Page>>;
}

/// Fetch all resources of a kind in a resource group (auto-paginate)
pub async fn fetch_resources(
    transport: &dyn Transport,
    def: &ResourceDef,
    resource_group: &str,
) -> anyhow::Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut next_link: Option<String> = None;

    loop {
        let page = transport
            .list_page(def, resource_group, next_link.as_deref())
            .await?;
        all_items.extend(page.items);

        if page.next_link.is_none() {
            break;
        }
        next_link = page.next_link;
    }

    tracing::debug!(
        "Fetched {} {} in {}",
        all_items.len(),
        def.display_name,
        resource_group
    );
    Ok(all_items)
}

/// Decode a wire envelope into an aggregate
pub fn decode<A: Aggregate>(scope: ResourceScope, value: Value) -> Result<A> {
    let inner: ResourceInner<A::Properties> =
        serde_json::from_value(value).map_err(|source| NetworkError::Decode {
            what: A::DISPLAY,
            source,
        })?;
    Ok(A::from_parts(scope, inner))
}

/// Run the pre-create pass and encode the aggregate for submission
pub fn encode<A: Aggregate>(resource: &mut A) -> Result<Value> {
    let wire = resource.to_wire()?;
    serde_json::to_value(&wire).map_err(|source| NetworkError::Encode {
        what: A::DISPLAY,
        source,
    })
}

fn apply_response<A: Aggregate>(resource: &mut A, response: Value) -> Result<()> {
    if response.is_null() {
        return Ok(());
    }
    let inner: ResourceInner<A::Properties> =
        serde_json::from_value(response).map_err(|source| NetworkError::Decode {
            what: A::DISPLAY,
            source,
        })?;
    resource.set_inner(inner);
    Ok(())
}

/// Scope of a listed item, preferring the scope recorded in its id
fn scope_of(item: &Value, subscription_id: &str, resource_group: &str) -> Option<ResourceScope> {
    if let Some(scope) = item
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|id| ResourceId::parse(id).ok())
        .and_then(|id| ResourceScope::from_id(&id))
    {
        return Some(scope);
    }
    let name = item.get("name").and_then(|v| v.as_str())?;
    Some(ResourceScope::new(subscription_id, resource_group, name))
}

/// Fetch one resource by name
pub async fn get<A: Aggregate>(transport: &dyn Transport, resource_group: &str, name: &str) -> Result<A> {
    let def = A::kind_def()?;
    let value = transport.get(def, resource_group, name).await?;
    let scope = ResourceScope::new(transport.subscription_id(), resource_group, name);
    decode(scope, value)
}

/// List every resource of kind `A` in a resource group
pub async fn list<A: Aggregate>(transport: &dyn Transport, resource_group: &str) -> Result<Vec<A>> {
    let def = A::kind_def()?;
    let items = fetch_resources(transport, def, resource_group).await?;

    let mut resources = Vec::with_capacity(items.len());
    for item in items {
        let Some(scope) = scope_of(&item, transport.subscription_id(), resource_group) else {
            tracing::warn!("Skipping unnamed {} in list response", A::DISPLAY);
            continue;
        };
        resources.push(decode(scope, item)?);
    }
    Ok(resources)
}

/// Submit the aggregate and rebuild it from the service's response
pub async fn create_or_update<A: Aggregate>(transport: &dyn Transport, resource: &mut A) -> Result<()> {
    let def = A::kind_def()?;
    let body = encode(resource)?;
    tracing::info!("Submitting {}", resource.label());

    let response = transport
        .put(def, resource.resource_group_name(), resource.name(), body)
        .await?;
    apply_response(resource, response)
}

/// Re-read the aggregate from the service, discarding local changes
pub async fn refresh<A: Aggregate>(transport: &dyn Transport, resource: &mut A) -> Result<()> {
    let def = A::kind_def()?;
    let response = transport
        .get(def, resource.resource_group_name(), resource.name())
        .await?;
    apply_response(resource, response)
}

pub async fn delete<A: Aggregate>(transport: &dyn Transport, resource_group: &str, name: &str) -> Result<()> {
    let def = A::kind_def()?;
    tracing::info!("Deleting {} '{}' in {}", A::DISPLAY, name, resource_group);
    transport.delete(def, resource_group, name).await?;
    Ok(())
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = item;

    for part in parts {
        // Handle array index
        if let Ok(idx) = part.parse::<usize>() {
            current = match current.get(idx) {
                Some(v) => v,
                None => return "-".to_string(),
            };
        } else {
            current = match current.get(part) {
                Some(v) => v,
                None => return "-".to_string(),
            };
        }
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.len().to_string(),
        Value::Object(_) => "[object]".to_string(),
    }
}

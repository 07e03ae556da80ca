//! Resource Registry - Load resource kind definitions from JSON
//!
//! Each top-level ARM resource kind the crate can manage is described in an
//! embedded JSON file: its provider namespace, resource type segment, API
//! version, table columns for the CLI, and the child collections it owns.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/gateways.json"),
    include_str!("../resources/networks.json"),
];

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub header: String,
    pub json_path: String,
    pub width: u16,
}

/// Child collection owned by a resource kind
#[derive(Debug, Clone, Deserialize)]
pub struct SubResourceDef {
    /// Path segment of the child type inside the parent id
    pub type_segment: String,
    pub display_name: String,
}

/// Resource kind definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub provider: String,
    pub resource_type: String,
    pub api_version: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub sub_resources: Vec<SubResourceDef>,
}

impl ResourceDef {
    /// `Provider/resourceType`, the form ARM reports in the `type` field
    pub fn full_type(&self) -> String {
        format!("{}/{}", self.provider, self.resource_type)
    }

    /// Whether `segment` names one of this kind's child collections
    pub fn has_sub_resource(&self, segment: &str) -> bool {
        self.sub_resources
            .iter()
            .any(|s| s.type_segment.eq_ignore_ascii_case(segment))
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Find the registry key for an ARM type such as `Microsoft.Network/loadBalancers`
pub fn find_by_full_type(full_type: &str) -> Option<(&'static str, &'static ResourceDef)> {
    get_registry()
        .resources
        .iter()
        .find(|(_, def)| def.full_type().eq_ignore_ascii_case(full_type))
        .map(|(key, def)| (key.as_str(), def))
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

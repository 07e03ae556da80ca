//! Network security groups

use super::models::{
    port_range, SecurityRuleAccess, SecurityRuleDirection, SecurityRuleProtocol,
};
use crate::error::{NetworkError, Result};
use crate::resource::{
    has_children, reference, same_name, Aggregate, BuildMode, Child, ChildBuilder, ChildProperties,
    DeferredCollection, ResourceInner, ResourceScope, SubResource,
};
use serde::{Deserialize, Serialize};

/// Lowest priority value a custom rule may use
pub const MIN_PRIORITY: u32 = 100;
/// Highest priority value a custom rule may use
pub const MAX_PRIORITY: u32 = 4096;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSecurityGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_rules: Option<Vec<SecurityRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_security_rules: Option<Vec<SecurityRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interfaces: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityRuleProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<SecurityRuleProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port_ranges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port_ranges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address_prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_address_prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_application_security_groups: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_application_security_groups: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<SecurityRuleAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SecurityRuleDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl SecurityRuleProperties {
    /// Any protocol, any port, any address in both directions
    fn match_any(&mut self) {
        self.protocol = Some(SecurityRuleProtocol::Any);
        self.source_port_range = Some("*".to_string());
        self.destination_port_range = Some("*".to_string());
        self.source_address_prefix = Some("*".to_string());
        self.destination_address_prefix = Some("*".to_string());
    }
}

impl ChildProperties for SecurityRuleProperties {
    const TYPE_SEGMENT: &'static str = "securityRules";
    const KIND: &'static str = "network security rule";
}

pub type SecurityRule = Child<SecurityRuleProperties>;

impl SecurityRule {
    pub fn source_application_security_group_ids(&self) -> Vec<&str> {
        ids(&self.properties.source_application_security_groups)
    }

    pub fn destination_application_security_group_ids(&self) -> Vec<&str> {
        ids(&self.properties.destination_application_security_groups)
    }
}

fn ids(refs: &Option<Vec<SubResource>>) -> Vec<&str> {
    refs.iter().flatten().map(|r| r.id.as_str()).collect()
}

/// Ids deduplicated case-insensitively, first spelling kept
fn unique_ids(refs: &Option<Vec<SubResource>>) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for id in ids(refs) {
        if !seen.iter().any(|s| same_name(s, id)) {
            seen.push(id);
        }
    }
    seen
}

/// A network security group
#[derive(Debug, Clone)]
pub struct NetworkSecurityGroup {
    scope: ResourceScope,
    inner: ResourceInner<NetworkSecurityGroupProperties>,
    rules: DeferredCollection<SecurityRuleProperties>,
}

has_children!(NetworkSecurityGroup { rules: SecurityRuleProperties });

impl Aggregate for NetworkSecurityGroup {
    type Properties = NetworkSecurityGroupProperties;
    const KIND: &'static str = "network-security-groups";
    const DISPLAY: &'static str = "network security group";

    fn from_parts(scope: ResourceScope, mut inner: ResourceInner<NetworkSecurityGroupProperties>) -> Self {
        let rules = DeferredCollection::from_wire(inner.properties.security_rules.take());
        Self { scope, inner, rules }
    }

    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    fn inner(&self) -> &ResourceInner<NetworkSecurityGroupProperties> {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut ResourceInner<NetworkSecurityGroupProperties> {
        &mut self.inner
    }

    fn clean_dangling_references(&mut self) -> usize {
        0
    }

    fn collect_children(&self, p: &mut NetworkSecurityGroupProperties) {
        p.security_rules = Some(self.rules.to_wire());
        // Read-only on the service side
        p.default_security_rules = None;
        p.provisioning_state = None;
    }

    fn validate(&self) -> Result<()> {
        if self.inner.location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        for rule in self.rules.iter() {
            let resource = || format!("network security rule '{}'", rule.name);
            if rule.properties.direction.is_none() {
                return Err(NetworkError::missing(resource(), "direction"));
            }
            if rule.properties.access.is_none() {
                return Err(NetworkError::missing(resource(), "access"));
            }
            if rule.properties.priority.is_none() {
                return Err(NetworkError::missing(resource(), "priority"));
            }
        }
        Ok(())
    }
}

impl NetworkSecurityGroup {
    pub fn security_rules(&self) -> &DeferredCollection<SecurityRuleProperties> {
        &self.rules
    }

    /// Platform rules reported by the service; never submitted back
    pub fn default_security_rules(&self) -> &[SecurityRule] {
        self.inner
            .properties
            .default_security_rules
            .as_deref()
            .unwrap_or_default()
    }

    /// Ids of subnets associated with the group
    pub fn subnet_ids(&self) -> Vec<&str> {
        unique_ids(&self.inner.properties.subnets)
    }

    /// Ids of network interfaces associated with the group
    pub fn network_interface_ids(&self) -> Vec<&str> {
        unique_ids(&self.inner.properties.network_interfaces)
    }

    /// A new rule starts out matching any protocol, port and address
    pub fn define_rule(&mut self, name: &str) -> ChildBuilder<'_, Self, SecurityRuleProperties> {
        let builder = ChildBuilder::<_, SecurityRuleProperties>::define(self, name);
        match builder.mode() {
            BuildMode::Define => builder.configure(SecurityRuleProperties::match_any),
            BuildMode::Update => builder,
        }
    }

    pub fn update_rule(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, SecurityRuleProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn without_rule(&mut self, name: &str) -> &mut Self {
        self.rules.remove(name);
        self
    }
}

impl<'a> ChildBuilder<'a, NetworkSecurityGroup, SecurityRuleProperties> {
    fn with_direction_and_access(mut self, direction: SecurityRuleDirection, access: SecurityRuleAccess) -> Self {
        let p = self.properties_mut();
        p.direction = Some(direction);
        p.access = Some(access);
        self
    }

    pub fn allow_inbound(self) -> Self {
        self.with_direction_and_access(SecurityRuleDirection::Inbound, SecurityRuleAccess::Allow)
    }

    pub fn allow_outbound(self) -> Self {
        self.with_direction_and_access(SecurityRuleDirection::Outbound, SecurityRuleAccess::Allow)
    }

    pub fn deny_inbound(self) -> Self {
        self.with_direction_and_access(SecurityRuleDirection::Inbound, SecurityRuleAccess::Deny)
    }

    pub fn deny_outbound(self) -> Self {
        self.with_direction_and_access(SecurityRuleDirection::Outbound, SecurityRuleAccess::Deny)
    }

    pub fn with_protocol(mut self, protocol: SecurityRuleProtocol) -> Self {
        self.properties_mut().protocol = Some(protocol);
        self
    }

    pub fn with_any_protocol(self) -> Self {
        self.with_protocol(SecurityRuleProtocol::Any)
    }

    // Source

    pub fn from_address(mut self, cidr: &str) -> Self {
        let p = self.properties_mut();
        p.source_address_prefix = Some(cidr.to_string());
        p.source_address_prefixes = None;
        p.source_application_security_groups = None;
        self
    }

    pub fn from_any_address(self) -> Self {
        self.from_address("*")
    }

    pub fn from_addresses(mut self, cidrs: &[&str]) -> Self {
        let p = self.properties_mut();
        p.source_address_prefix = None;
        p.source_address_prefixes = Some(cidrs.iter().map(|c| c.to_string()).collect());
        p.source_application_security_groups = None;
        self
    }

    pub fn from_port(self, port: u16) -> Self {
        self.from_port_range(port, port)
    }

    pub fn from_any_port(mut self) -> Self {
        let p = self.properties_mut();
        p.source_port_range = Some("*".to_string());
        p.source_port_ranges = None;
        self
    }

    pub fn from_port_range(mut self, from: u16, to: u16) -> Self {
        let p = self.properties_mut();
        p.source_port_range = Some(port_range(from, to));
        p.source_port_ranges = None;
        self
    }

    pub fn from_port_ranges(mut self, ranges: &[&str]) -> Self {
        let p = self.properties_mut();
        p.source_port_range = None;
        p.source_port_ranges = Some(ranges.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Match traffic from an application security group; clears source address prefixes.
    pub fn with_source_application_security_group(mut self, asg_id: &str) -> Self {
        let p = self.properties_mut();
        reference::add_unique(&mut p.source_application_security_groups, SubResource::new(asg_id));
        p.source_address_prefix = None;
        p.source_address_prefixes = None;
        self
    }

    // Destination

    pub fn to_address(mut self, cidr: &str) -> Self {
        let p = self.properties_mut();
        p.destination_address_prefix = Some(cidr.to_string());
        p.destination_address_prefixes = None;
        p.destination_application_security_groups = None;
        self
    }

    pub fn to_any_address(self) -> Self {
        self.to_address("*")
    }

    pub fn to_addresses(mut self, cidrs: &[&str]) -> Self {
        let p = self.properties_mut();
        p.destination_address_prefix = None;
        p.destination_address_prefixes = Some(cidrs.iter().map(|c| c.to_string()).collect());
        p.destination_application_security_groups = None;
        self
    }

    pub fn to_port(self, port: u16) -> Self {
        self.to_port_range(port, port)
    }

    pub fn to_any_port(mut self) -> Self {
        let p = self.properties_mut();
        p.destination_port_range = Some("*".to_string());
        p.destination_port_ranges = None;
        self
    }

    pub fn to_port_range(mut self, from: u16, to: u16) -> Self {
        let p = self.properties_mut();
        p.destination_port_range = Some(port_range(from, to));
        p.destination_port_ranges = None;
        self
    }

    pub fn to_port_ranges(mut self, ranges: &[&str]) -> Self {
        let p = self.properties_mut();
        p.destination_port_range = None;
        p.destination_port_ranges = Some(ranges.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Match traffic to an application security group; clears destination address prefixes.
    pub fn with_destination_application_security_group(mut self, asg_id: &str) -> Self {
        let p = self.properties_mut();
        reference::add_unique(&mut p.destination_application_security_groups, SubResource::new(asg_id));
        p.destination_address_prefix = None;
        p.destination_address_prefixes = None;
        self
    }

    /// Rule priority; lower numbers are evaluated first.
    pub fn with_priority(mut self, priority: u32) -> Result<Self> {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            return Err(NetworkError::invalid(
                "priority",
                format!(
                    "{} is outside {}..={}",
                    priority, MIN_PRIORITY, MAX_PRIORITY
                ),
            ));
        }
        self.properties_mut().priority = Some(priority);
        Ok(self)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.properties_mut().description = Some(description.to_string());
        self
    }
}

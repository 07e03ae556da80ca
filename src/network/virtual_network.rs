//! Virtual networks and their subnets

use crate::error::{NetworkError, Result};
use crate::resource::{
    has_children, Aggregate, Child, ChildBuilder, ChildProperties, DeferredCollection,
    ResourceInner, ResourceScope, SubResource,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DhcpOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_space: Option<AddressSpace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_options: Option<DhcpOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<Subnet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl NetworkProperties {
    fn ensure_address_prefixes(&mut self) -> &mut Vec<String> {
        self.address_space
            .get_or_insert_with(AddressSpace::default)
            .address_prefixes
            .get_or_insert_with(Vec::new)
    }

    fn ensure_dns_servers(&mut self) -> &mut Vec<String> {
        self.dhcp_options
            .get_or_insert_with(DhcpOptions::default)
            .dns_servers
            .get_or_insert_with(Vec::new)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubnetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_configurations: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for SubnetProperties {
    const TYPE_SEGMENT: &'static str = "subnets";
    const KIND: &'static str = "subnet";
}

pub type Subnet = Child<SubnetProperties>;

impl Subnet {
    pub fn address_prefix(&self) -> Option<&str> {
        self.properties.address_prefix.as_deref()
    }

    pub fn network_security_group_id(&self) -> Option<&str> {
        self.properties.network_security_group.as_ref().map(|r| r.id.as_str())
    }

    pub fn route_table_id(&self) -> Option<&str> {
        self.properties.route_table.as_ref().map(|r| r.id.as_str())
    }

    /// Number of IP configurations attached to the subnet, as last reported
    pub fn network_interface_ip_configuration_count(&self) -> usize {
        self.properties.ip_configurations.as_ref().map_or(0, Vec::len)
    }
}

/// A virtual network
#[derive(Debug, Clone)]
pub struct Network {
    scope: ResourceScope,
    inner: ResourceInner<NetworkProperties>,
    subnets: DeferredCollection<SubnetProperties>,
}

has_children!(Network { subnets: SubnetProperties });

impl Aggregate for Network {
    type Properties = NetworkProperties;
    const KIND: &'static str = "networks";
    const DISPLAY: &'static str = "virtual network";

    fn from_parts(scope: ResourceScope, mut inner: ResourceInner<NetworkProperties>) -> Self {
        let subnets = DeferredCollection::from_wire(inner.properties.subnets.take());
        Self {
            scope,
            inner,
            subnets,
        }
    }

    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    fn inner(&self) -> &ResourceInner<NetworkProperties> {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut ResourceInner<NetworkProperties> {
        &mut self.inner
    }

    fn clean_dangling_references(&mut self) -> usize {
        0
    }

    fn collect_children(&self, p: &mut NetworkProperties) {
        p.subnets = Some(self.subnets.to_wire());
        p.provisioning_state = None;
    }

    fn validate(&self) -> Result<()> {
        if self.inner.location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        if self.address_spaces().is_empty() {
            return Err(NetworkError::missing(self.label(), "addressSpace"));
        }
        for subnet in self.subnets.iter() {
            if subnet.address_prefix().is_none() {
                return Err(NetworkError::missing(
                    format!("subnet '{}'", subnet.name),
                    "addressPrefix",
                ));
            }
        }
        Ok(())
    }
}

impl Network {
    pub fn address_spaces(&self) -> Vec<&str> {
        self.inner
            .properties
            .address_space
            .iter()
            .flat_map(|a| a.address_prefixes.iter().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn dns_server_ips(&self) -> Vec<&str> {
        self.inner
            .properties
            .dhcp_options
            .iter()
            .flat_map(|d| d.dns_servers.iter().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn subnets(&self) -> &DeferredCollection<SubnetProperties> {
        &self.subnets
    }

    pub fn with_address_space(&mut self, cidr: &str) -> &mut Self {
        let prefixes = self.inner.properties.ensure_address_prefixes();
        if !prefixes.iter().any(|p| p == cidr) {
            prefixes.push(cidr.to_string());
        }
        self
    }

    pub fn without_address_space(&mut self, cidr: &str) -> &mut Self {
        if let Some(prefixes) = self
            .inner
            .properties
            .address_space
            .as_mut()
            .and_then(|a| a.address_prefixes.as_mut())
        {
            prefixes.retain(|p| p != cidr);
        }
        self
    }

    pub fn with_dns_server(&mut self, ip_address: &str) -> &mut Self {
        let servers = self.inner.properties.ensure_dns_servers();
        if !servers.iter().any(|s| s == ip_address) {
            servers.push(ip_address.to_string());
        }
        self
    }

    pub fn with_subnet(&mut self, name: &str, cidr: &str) -> &mut Self {
        self.define_subnet(name).with_address_prefix(cidr).attach()
    }

    /// Replace every subnet with the given `(name, cidr)` pairs.
    pub fn with_subnets<'s>(&mut self, subnets: impl IntoIterator<Item = (&'s str, &'s str)>) -> &mut Self {
        self.subnets.clear();
        for (name, cidr) in subnets {
            self.with_subnet(name, cidr);
        }
        self
    }

    pub fn without_subnet(&mut self, name: &str) -> &mut Self {
        self.subnets.remove(name);
        self
    }

    pub fn define_subnet(&mut self, name: &str) -> ChildBuilder<'_, Self, SubnetProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn update_subnet(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, SubnetProperties>> {
        ChildBuilder::update(self, name)
    }
}

impl<'a> ChildBuilder<'a, Network, SubnetProperties> {
    pub fn with_address_prefix(mut self, cidr: &str) -> Self {
        self.properties_mut().address_prefix = Some(cidr.to_string());
        self
    }

    pub fn with_existing_network_security_group(mut self, nsg_id: &str) -> Self {
        self.properties_mut().network_security_group = Some(SubResource::new(nsg_id));
        self
    }

    pub fn without_network_security_group(mut self) -> Self {
        self.properties_mut().network_security_group = None;
        self
    }

    pub fn with_existing_route_table(mut self, route_table_id: &str) -> Self {
        self.properties_mut().route_table = Some(SubResource::new(route_table_id));
        self
    }

    pub fn without_route_table(mut self) -> Self {
        self.properties_mut().route_table = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NSG: &str = "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/networkSecurityGroups/nsg";

    fn network() -> Network {
        let mut vnet = Network::from_parts(ResourceScope::new("s", "g", "vnet"), ResourceInner::default());
        vnet.with_region("westus");
        vnet
    }

    #[test]
    fn test_ensure_helpers_create_containers() {
        let mut vnet = network();
        assert!(vnet.inner().properties.address_space.is_none());
        vnet.with_address_space("10.0.0.0/16")
            .with_address_space("10.0.0.0/16")
            .with_dns_server("10.0.0.4");
        assert_eq!(vnet.address_spaces(), vec!["10.0.0.0/16"]);
        assert_eq!(vnet.dns_server_ips(), vec!["10.0.0.4"]);

        vnet.without_address_space("10.0.0.0/16");
        assert!(vnet.address_spaces().is_empty());
    }

    #[test]
    fn test_with_subnets_replaces_all() {
        let mut vnet = network();
        vnet.with_address_space("10.0.0.0/16").with_subnet("old", "10.0.9.0/24");
        vnet.with_subnets([("web", "10.0.1.0/24"), ("db", "10.0.2.0/24")]);
        let names: Vec<&str> = vnet.subnets().names().collect();
        assert_eq!(names, vec!["db", "web"]);
    }

    #[test]
    fn test_subnet_references() {
        let mut vnet = network();
        vnet.define_subnet("web")
            .with_address_prefix("10.0.1.0/24")
            .with_existing_network_security_group(NSG)
            .attach();
        assert_eq!(vnet.subnets().get("web").unwrap().network_security_group_id(), Some(NSG));

        vnet.update_subnet("web").unwrap().without_network_security_group().attach();
        assert!(vnet.subnets().get("web").unwrap().network_security_group_id().is_none());
    }

    #[test]
    fn test_validate() {
        let mut vnet = network();
        assert!(matches!(
            vnet.to_wire().unwrap_err(),
            NetworkError::MissingField { field: "addressSpace", .. }
        ));

        vnet.with_address_space("10.0.0.0/16");
        vnet.define_subnet("empty").attach();
        assert!(matches!(
            vnet.to_wire().unwrap_err(),
            NetworkError::MissingField { field: "addressPrefix", .. }
        ));

        vnet.without_subnet("empty").with_subnet("web", "10.0.1.0/24");
        let wire = vnet.to_wire().unwrap();
        assert_eq!(wire.properties.subnets.map(|s| s.len()), Some(1));
    }
}

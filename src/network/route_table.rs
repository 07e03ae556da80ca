//! Route tables

use super::models::RouteNextHopType;
use super::random_resource_name;
use crate::error::{NetworkError, Result};
use crate::resource::{
    has_children, Aggregate, Child, ChildBuilder, ChildProperties, DeferredCollection,
    ResourceInner, ResourceScope, SubResource,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteTableProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_bgp_route_propagation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop_type: Option<RouteNextHopType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for RouteProperties {
    const TYPE_SEGMENT: &'static str = "routes";
    const KIND: &'static str = "route";
}

pub type Route = Child<RouteProperties>;

impl Route {
    pub fn destination_address_prefix(&self) -> Option<&str> {
        self.properties.address_prefix.as_deref()
    }

    pub fn next_hop_type(&self) -> Option<RouteNextHopType> {
        self.properties.next_hop_type
    }

    pub fn next_hop_ip_address(&self) -> Option<&str> {
        self.properties.next_hop_ip_address.as_deref()
    }
}

/// A route table
#[derive(Debug, Clone)]
pub struct RouteTable {
    scope: ResourceScope,
    inner: ResourceInner<RouteTableProperties>,
    routes: DeferredCollection<RouteProperties>,
}

has_children!(RouteTable { routes: RouteProperties });

impl Aggregate for RouteTable {
    type Properties = RouteTableProperties;
    const KIND: &'static str = "route-tables";
    const DISPLAY: &'static str = "route table";

    fn from_parts(scope: ResourceScope, mut inner: ResourceInner<RouteTableProperties>) -> Self {
        let routes = DeferredCollection::from_wire(inner.properties.routes.take());
        Self { scope, inner, routes }
    }

    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    fn inner(&self) -> &ResourceInner<RouteTableProperties> {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut ResourceInner<RouteTableProperties> {
        &mut self.inner
    }

    fn clean_dangling_references(&mut self) -> usize {
        0
    }

    fn collect_children(&self, p: &mut RouteTableProperties) {
        p.routes = Some(self.routes.to_wire());
        p.provisioning_state = None;
    }

    fn validate(&self) -> Result<()> {
        if self.inner.location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        for route in self.routes.iter() {
            let resource = || format!("route '{}'", route.name);
            if route.destination_address_prefix().is_none() {
                return Err(NetworkError::missing(resource(), "addressPrefix"));
            }
            match route.next_hop_type() {
                None => return Err(NetworkError::missing(resource(), "nextHopType")),
                Some(RouteNextHopType::VirtualAppliance) if route.next_hop_ip_address().is_none() => {
                    return Err(NetworkError::missing(resource(), "nextHopIpAddress"))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl RouteTable {
    pub fn routes(&self) -> &DeferredCollection<RouteProperties> {
        &self.routes
    }

    /// Ids of subnets the table is associated with, as last reported
    pub fn subnet_ids(&self) -> Vec<&str> {
        self.inner
            .properties
            .subnets
            .iter()
            .flatten()
            .map(|s| s.id.as_str())
            .collect()
    }

    pub fn is_bgp_route_propagation_disabled(&self) -> bool {
        self.inner.properties.disable_bgp_route_propagation.unwrap_or(false)
    }

    pub fn with_disable_bgp_route_propagation(&mut self) -> &mut Self {
        self.inner.properties.disable_bgp_route_propagation = Some(true);
        self
    }

    pub fn with_enable_bgp_route_propagation(&mut self) -> &mut Self {
        self.inner.properties.disable_bgp_route_propagation = Some(false);
        self
    }

    /// Add a route under a generated name.
    pub fn with_route(&mut self, destination_cidr: &str, next_hop: RouteNextHopType) -> &mut Self {
        let name = random_resource_name("route", 20);
        self.define_route(&name)
            .with_destination_address_prefix(destination_cidr)
            .with_next_hop(next_hop)
            .attach()
    }

    /// Add a route through a virtual appliance under a generated name.
    pub fn with_route_via_virtual_appliance(&mut self, destination_cidr: &str, ip_address: &str) -> &mut Self {
        let name = random_resource_name("route", 20);
        self.define_route(&name)
            .with_destination_address_prefix(destination_cidr)
            .with_next_hop_to_virtual_appliance(ip_address)
            .attach()
    }

    pub fn without_route(&mut self, name: &str) -> &mut Self {
        self.routes.remove(name);
        self
    }

    pub fn define_route(&mut self, name: &str) -> ChildBuilder<'_, Self, RouteProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn update_route(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, RouteProperties>> {
        ChildBuilder::update(self, name)
    }
}

impl<'a> ChildBuilder<'a, RouteTable, RouteProperties> {
    pub fn with_destination_address_prefix(mut self, cidr: &str) -> Self {
        self.properties_mut().address_prefix = Some(cidr.to_string());
        self
    }

    /// Next hop of any type other than a virtual appliance; clears the hop address.
    pub fn with_next_hop(mut self, next_hop: RouteNextHopType) -> Self {
        let p = self.properties_mut();
        p.next_hop_type = Some(next_hop);
        if next_hop != RouteNextHopType::VirtualAppliance {
            p.next_hop_ip_address = None;
        }
        self
    }

    pub fn with_next_hop_to_virtual_appliance(mut self, ip_address: &str) -> Self {
        let p = self.properties_mut();
        p.next_hop_type = Some(RouteNextHopType::VirtualAppliance);
        p.next_hop_ip_address = Some(ip_address.to_string());
        self
    }
}

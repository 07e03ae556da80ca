//! Load balancers
//!
//! Load balancing rules tie a frontend, a backend, and a probe together;
//! inbound NAT rules point at a frontend. Frontends and backends also carry
//! server-computed back-references to the rules using them.

use super::models::{FrontendIpProperties, LoadDistribution, ProbeProtocol, TransportProtocol};
use crate::error::{NetworkError, Result};
use crate::resource::{
    has_children, Aggregate, Child, ChildBuilder, ChildProperties, DeferredCollection,
    ResourceInner, ResourceScope, SubResource,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadBalancerProperties {
    #[serde(rename = "frontendIPConfigurations", skip_serializing_if = "Option::is_none")]
    pub frontend_ip_configurations: Option<Vec<Frontend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_address_pools: Option<Vec<Backend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<Vec<Probe>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing_rules: Option<Vec<LoadBalancingRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_nat_rules: Option<Vec<InboundNatRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Frontend with the rule back-references the service reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendProperties {
    #[serde(flatten)]
    pub ip: FrontendIpProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing_rules: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_nat_rules: Option<Vec<SubResource>>,
}

impl ChildProperties for FrontendProperties {
    const TYPE_SEGMENT: &'static str = "frontendIPConfigurations";
    const KIND: &'static str = "load balancer frontend";
}

pub type Frontend = Child<FrontendProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendProperties {
    #[serde(rename = "backendIPConfigurations", skip_serializing_if = "Option::is_none")]
    pub backend_ip_configurations: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancing_rules: Option<Vec<SubResource>>,
}

impl ChildProperties for BackendProperties {
    const TYPE_SEGMENT: &'static str = "backendAddressPools";
    const KIND: &'static str = "load balancer backend";
}

pub type Backend = Child<BackendProperties>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProbeProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_in_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_probes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

impl Default for ProbeProperties {
    fn default() -> Self {
        Self {
            protocol: Some(ProbeProtocol::Tcp),
            port: None,
            interval_in_seconds: Some(15),
            number_of_probes: Some(2),
            request_path: None,
        }
    }
}

impl ChildProperties for ProbeProperties {
    const TYPE_SEGMENT: &'static str = "probes";
    const KIND: &'static str = "load balancer probe";
}

pub type Probe = Child<ProbeProperties>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadBalancingRuleProperties {
    #[serde(rename = "frontendIPConfiguration", skip_serializing_if = "Option::is_none")]
    pub frontend_ip_configuration: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_address_pool: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<TransportProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_in_minutes: Option<u32>,
    #[serde(rename = "enableFloatingIP", skip_serializing_if = "Option::is_none")]
    pub enable_floating_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_distribution: Option<LoadDistribution>,
}

impl Default for LoadBalancingRuleProperties {
    fn default() -> Self {
        Self {
            frontend_ip_configuration: None,
            backend_address_pool: None,
            probe: None,
            protocol: Some(TransportProtocol::Tcp),
            frontend_port: None,
            backend_port: None,
            idle_timeout_in_minutes: None,
            enable_floating_ip: Some(false),
            load_distribution: None,
        }
    }
}

impl ChildProperties for LoadBalancingRuleProperties {
    const TYPE_SEGMENT: &'static str = "loadBalancingRules";
    const KIND: &'static str = "load balancing rule";
}

pub type LoadBalancingRule = Child<LoadBalancingRuleProperties>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundNatRuleProperties {
    #[serde(rename = "frontendIPConfiguration", skip_serializing_if = "Option::is_none")]
    pub frontend_ip_configuration: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<TransportProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_in_minutes: Option<u32>,
    #[serde(rename = "enableFloatingIP", skip_serializing_if = "Option::is_none")]
    pub enable_floating_ip: Option<bool>,
}

impl Default for InboundNatRuleProperties {
    fn default() -> Self {
        Self {
            frontend_ip_configuration: None,
            protocol: Some(TransportProtocol::Tcp),
            frontend_port: None,
            backend_port: None,
            idle_timeout_in_minutes: None,
            enable_floating_ip: Some(false),
        }
    }
}

impl ChildProperties for InboundNatRuleProperties {
    const TYPE_SEGMENT: &'static str = "inboundNatRules";
    const KIND: &'static str = "inbound NAT rule";
}

pub type InboundNatRule = Child<InboundNatRuleProperties>;

/// A load balancer and its child collections
#[derive(Debug, Clone)]
pub struct LoadBalancer {
    scope: ResourceScope,
    inner: ResourceInner<LoadBalancerProperties>,
    frontends: DeferredCollection<FrontendProperties>,
    backends: DeferredCollection<BackendProperties>,
    probes: DeferredCollection<ProbeProperties>,
    rules: DeferredCollection<LoadBalancingRuleProperties>,
    nat_rules: DeferredCollection<InboundNatRuleProperties>,
}

has_children!(LoadBalancer {
    frontends: FrontendProperties,
    backends: BackendProperties,
    probes: ProbeProperties,
    rules: LoadBalancingRuleProperties,
    nat_rules: InboundNatRuleProperties,
});

impl Aggregate for LoadBalancer {
    type Properties = LoadBalancerProperties;
    const KIND: &'static str = "load-balancers";
    const DISPLAY: &'static str = "load balancer";

    fn from_parts(scope: ResourceScope, mut inner: ResourceInner<LoadBalancerProperties>) -> Self {
        let p = &mut inner.properties;
        let frontends = DeferredCollection::from_wire(p.frontend_ip_configurations.take());
        let backends = DeferredCollection::from_wire(p.backend_address_pools.take());
        let probes = DeferredCollection::from_wire(p.probes.take());
        let rules = DeferredCollection::from_wire(p.load_balancing_rules.take());
        let nat_rules = DeferredCollection::from_wire(p.inbound_nat_rules.take());

        Self {
            scope,
            inner,
            frontends,
            backends,
            probes,
            rules,
            nat_rules,
        }
    }

    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    fn inner(&self) -> &ResourceInner<LoadBalancerProperties> {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut ResourceInner<LoadBalancerProperties> {
        &mut self.inner
    }

    fn clean_dangling_references(&mut self) -> usize {
        let mut cleared = 0;

        for rule in self.rules.iter_mut() {
            let p = &mut rule.properties;
            cleared += self.frontends.clear_dangling(&mut p.frontend_ip_configuration) as usize;
            cleared += self.backends.clear_dangling(&mut p.backend_address_pool) as usize;
            cleared += self.probes.clear_dangling(&mut p.probe) as usize;
        }

        for rule in self.nat_rules.iter_mut() {
            cleared += self
                .frontends
                .clear_dangling(&mut rule.properties.frontend_ip_configuration) as usize;
        }

        // Back-references are pruned, not counted as repairs
        for frontend in self.frontends.iter_mut() {
            self.rules.retain_resolvable(&mut frontend.properties.load_balancing_rules);
            self.nat_rules.retain_resolvable(&mut frontend.properties.inbound_nat_rules);
        }
        for backend in self.backends.iter_mut() {
            self.rules.retain_resolvable(&mut backend.properties.load_balancing_rules);
        }

        cleared
    }

    fn collect_children(&self, p: &mut LoadBalancerProperties) {
        p.frontend_ip_configurations = Some(self.frontends.to_wire());
        p.backend_address_pools = Some(self.backends.to_wire());
        p.probes = Some(self.probes.to_wire());
        p.load_balancing_rules = Some(self.rules.to_wire());
        p.inbound_nat_rules = Some(self.nat_rules.to_wire());
        p.provisioning_state = None;
    }

    fn validate(&self) -> Result<()> {
        if self.inner.location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        for rule in self.rules.iter() {
            let resource = || format!("load balancing rule '{}'", rule.name);
            if rule.properties.frontend_port.is_none() {
                return Err(NetworkError::missing(resource(), "frontendPort"));
            }
            if rule.properties.backend_port.is_none() {
                return Err(NetworkError::missing(resource(), "backendPort"));
            }
        }
        for rule in self.nat_rules.iter() {
            if rule.properties.frontend_port.is_none() {
                return Err(NetworkError::missing(
                    format!("inbound NAT rule '{}'", rule.name),
                    "frontendPort",
                ));
            }
        }
        Ok(())
    }
}

impl LoadBalancer {
    pub fn frontends(&self) -> &DeferredCollection<FrontendProperties> {
        &self.frontends
    }

    pub fn backends(&self) -> &DeferredCollection<BackendProperties> {
        &self.backends
    }

    pub fn probes(&self) -> &DeferredCollection<ProbeProperties> {
        &self.probes
    }

    pub fn load_balancing_rules(&self) -> &DeferredCollection<LoadBalancingRuleProperties> {
        &self.rules
    }

    pub fn inbound_nat_rules(&self) -> &DeferredCollection<InboundNatRuleProperties> {
        &self.nat_rules
    }

    /// Load balancing rules a frontend reports, resolved by reference.
    /// References to rules that no longer exist are skipped.
    pub fn frontend_rules(&self, frontend_name: &str) -> Vec<&LoadBalancingRule> {
        let Some(frontend) = self.frontends.get(frontend_name) else {
            return Vec::new();
        };
        frontend
            .properties
            .load_balancing_rules
            .iter()
            .flatten()
            .filter_map(|r| self.rules.resolve(r).ok().flatten())
            .collect()
    }

    /// Names of the load balancing rules sending traffic to a backend
    pub fn backend_rule_names(&self, backend_name: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| {
                r.properties
                    .backend_address_pool
                    .as_ref()
                    .is_some_and(|b| b.points_to(backend_name))
            })
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn define_public_frontend(&mut self, name: &str) -> ChildBuilder<'_, Self, FrontendProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_private_frontend(&mut self, name: &str) -> ChildBuilder<'_, Self, FrontendProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_backend(&mut self, name: &str) -> ChildBuilder<'_, Self, BackendProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_tcp_probe(&mut self, name: &str) -> ChildBuilder<'_, Self, ProbeProperties> {
        ChildBuilder::<_, ProbeProperties>::define(self, name).configure(|p| {
            p.protocol = Some(ProbeProtocol::Tcp);
            p.request_path = None;
        })
    }

    pub fn define_http_probe(&mut self, name: &str) -> ChildBuilder<'_, Self, ProbeProperties> {
        ChildBuilder::<_, ProbeProperties>::define(self, name).configure(|p| {
            p.protocol = Some(ProbeProtocol::Http);
            if p.request_path.is_none() {
                p.request_path = Some("/".to_string());
            }
            if p.port.is_none() {
                p.port = Some(80);
            }
        })
    }

    pub fn define_load_balancing_rule(
        &mut self,
        name: &str,
    ) -> ChildBuilder<'_, Self, LoadBalancingRuleProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_inbound_nat_rule(&mut self, name: &str) -> ChildBuilder<'_, Self, InboundNatRuleProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn update_frontend(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, FrontendProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_backend(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, BackendProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_probe(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, ProbeProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_load_balancing_rule(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, LoadBalancingRuleProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_inbound_nat_rule(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, InboundNatRuleProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn without_frontend(&mut self, name: &str) -> &mut Self {
        self.frontends.remove(name);
        self
    }

    pub fn without_backend(&mut self, name: &str) -> &mut Self {
        self.backends.remove(name);
        self
    }

    pub fn without_probe(&mut self, name: &str) -> &mut Self {
        self.probes.remove(name);
        self
    }

    pub fn without_load_balancing_rule(&mut self, name: &str) -> &mut Self {
        self.rules.remove(name);
        self
    }

    pub fn without_inbound_nat_rule(&mut self, name: &str) -> &mut Self {
        self.nat_rules.remove(name);
        self
    }
}

impl<'a> ChildBuilder<'a, LoadBalancer, FrontendProperties> {
    /// Private frontend in a subnet of an existing network; clears any public IP.
    pub fn with_existing_subnet(mut self, network_id: &str, subnet_name: &str) -> Result<Self> {
        self.properties_mut().ip.set_subnet(network_id, subnet_name)?;
        Ok(self)
    }

    /// Public frontend on an existing public IP; clears any subnet and private IP.
    pub fn with_existing_public_ip_address(mut self, public_ip_id: &str) -> Self {
        self.properties_mut().ip.set_public_ip(public_ip_id);
        self
    }

    pub fn with_private_ip_address_static(mut self, ip_address: &str) -> Self {
        self.properties_mut().ip.set_static_ip(ip_address);
        self
    }

    pub fn with_private_ip_address_dynamic(mut self) -> Self {
        self.properties_mut().ip.set_dynamic_ip();
        self
    }
}

impl<'a> ChildBuilder<'a, LoadBalancer, ProbeProperties> {
    pub fn with_port(mut self, port: u16) -> Self {
        self.properties_mut().port = Some(port);
        self
    }

    /// HTTP request path, always starting with `/`
    pub fn with_request_path(mut self, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        self.properties_mut().request_path = Some(path);
        self
    }

    pub fn with_interval_in_seconds(mut self, seconds: u32) -> Self {
        self.properties_mut().interval_in_seconds = Some(seconds);
        self
    }

    pub fn with_number_of_probes(mut self, probes: u32) -> Self {
        self.properties_mut().number_of_probes = Some(probes);
        self
    }
}

impl<'a> ChildBuilder<'a, LoadBalancer, LoadBalancingRuleProperties> {
    pub fn with_protocol(mut self, protocol: TransportProtocol) -> Self {
        self.properties_mut().protocol = Some(protocol);
        self
    }

    pub fn from_frontend(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<FrontendProperties>(name)?;
        self.properties_mut().frontend_ip_configuration = Some(reference);
        Ok(self)
    }

    /// Frontend port; also the backend port until one is set explicitly.
    pub fn from_frontend_port(mut self, port: u16) -> Self {
        let p = self.properties_mut();
        p.frontend_port = Some(port);
        if p.backend_port.is_none() {
            p.backend_port = Some(port);
        }
        self
    }

    pub fn to_backend(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<BackendProperties>(name)?;
        self.properties_mut().backend_address_pool = Some(reference);
        Ok(self)
    }

    pub fn to_backend_port(mut self, port: u16) -> Self {
        self.properties_mut().backend_port = Some(port);
        self
    }

    pub fn with_probe(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<ProbeProperties>(name)?;
        self.properties_mut().probe = Some(reference);
        Ok(self)
    }

    pub fn without_probe(mut self) -> Self {
        self.properties_mut().probe = None;
        self
    }

    pub fn with_floating_ip(mut self, enabled: bool) -> Self {
        self.properties_mut().enable_floating_ip = Some(enabled);
        self
    }

    pub fn with_idle_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.properties_mut().idle_timeout_in_minutes = Some(minutes);
        self
    }

    pub fn with_load_distribution(mut self, distribution: LoadDistribution) -> Self {
        self.properties_mut().load_distribution = Some(distribution);
        self
    }
}

impl<'a> ChildBuilder<'a, LoadBalancer, InboundNatRuleProperties> {
    pub fn with_protocol(mut self, protocol: TransportProtocol) -> Self {
        self.properties_mut().protocol = Some(protocol);
        self
    }

    pub fn from_frontend(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<FrontendProperties>(name)?;
        self.properties_mut().frontend_ip_configuration = Some(reference);
        Ok(self)
    }

    pub fn from_frontend_port(mut self, port: u16) -> Self {
        self.properties_mut().frontend_port = Some(port);
        self
    }

    pub fn to_backend_port(mut self, port: u16) -> Self {
        self.properties_mut().backend_port = Some(port);
        self
    }

    pub fn with_floating_ip(mut self, enabled: bool) -> Self {
        self.properties_mut().enable_floating_ip = Some(enabled);
        self
    }

    pub fn with_idle_timeout_in_minutes(mut self, minutes: u32) -> Self {
        self.properties_mut().idle_timeout_in_minutes = Some(minutes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VNET: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet";
    const PIP: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/publicIPAddresses/pip";

    fn balancer() -> LoadBalancer {
        let mut lb = LoadBalancer::from_parts(ResourceScope::new("sub", "rg", "lb"), ResourceInner::default());
        lb.with_region("eastus");
        lb.define_public_frontend("fe").with_existing_public_ip_address(PIP).attach();
        lb.define_backend("be").attach();
        lb.define_tcp_probe("probe").with_port(22).attach();
        lb.define_load_balancing_rule("http")
            .from_frontend("fe")
            .unwrap()
            .from_frontend_port(80)
            .to_backend("be")
            .unwrap()
            .with_probe("probe")
            .unwrap()
            .attach();
        lb.define_inbound_nat_rule("ssh")
            .from_frontend("fe")
            .unwrap()
            .from_frontend_port(5000)
            .to_backend_port(22)
            .attach();
        lb
    }

    #[test]
    fn test_backend_port_defaults_to_frontend_port() {
        let lb = balancer();
        let rule = lb.load_balancing_rules().get("http").unwrap();
        assert_eq!(rule.properties.backend_port, Some(80));
        assert_eq!(lb.backend_rule_names("BE"), vec!["http"]);
    }

    #[test]
    fn test_cleanup_clears_rule_references() {
        let mut lb = balancer();
        lb.without_frontend("fe").without_probe("probe");

        assert_eq!(lb.clean_dangling_references(), 3);
        let rule = lb.load_balancing_rules().get("http").unwrap();
        assert!(rule.properties.frontend_ip_configuration.is_none());
        assert!(rule.properties.probe.is_none());
        assert!(rule.properties.backend_address_pool.is_some());
        assert!(lb.inbound_nat_rules().get("ssh").unwrap().properties.frontend_ip_configuration.is_none());
    }

    #[test]
    fn test_frontend_rules_skip_absent_targets() {
        let json = serde_json::json!({
            "location": "eastus",
            "properties": {
                "frontendIPConfigurations": [{
                    "name": "fe",
                    "properties": {
                        "publicIPAddress": {"id": PIP},
                        "loadBalancingRules": [
                            {"id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/loadBalancers/lb/loadBalancingRules/http"},
                            {"id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/loadBalancers/lb/loadBalancingRules/gone"}
                        ]
                    }
                }],
                "loadBalancingRules": [{"name": "http", "properties": {"frontendPort": 80, "backendPort": 80}}]
            }
        });
        let inner: ResourceInner<LoadBalancerProperties> = serde_json::from_value(json).unwrap();
        let mut lb = LoadBalancer::from_parts(ResourceScope::new("sub", "rg", "lb"), inner);

        let rules = lb.frontend_rules("fe");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "http");
        assert!(lb.frontends().get("fe").unwrap().properties.ip.is_public());

        lb.clean_dangling_references();
        let refs = lb.frontends().get("fe").unwrap().properties.load_balancing_rules.clone();
        assert_eq!(refs.map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_frontend_subnet_clears_public_ip() {
        let mut lb = balancer();
        lb.update_frontend("fe")
            .unwrap()
            .with_existing_subnet(VNET, "default")
            .unwrap()
            .with_private_ip_address_static("10.0.0.10")
            .attach();
        let fe = &lb.frontends().get("fe").unwrap().properties.ip;
        assert!(fe.is_private());
        assert!(!fe.is_public());
        assert_eq!(fe.subnet_name(), Some("default"));
    }

    #[test]
    fn test_validate_requires_rule_ports() {
        let mut lb = balancer();
        lb.define_inbound_nat_rule("bad").from_frontend("fe").unwrap().attach();
        let err = lb.to_wire().unwrap_err();
        assert!(matches!(err, NetworkError::MissingField { field: "frontendPort", .. }));
    }

    #[test]
    fn test_http_probe_defaults() {
        let mut lb = balancer();
        lb.define_http_probe("web").with_request_path("healthz").attach();
        let probe = lb.probes().get("web").unwrap();
        assert_eq!(probe.properties.protocol, Some(ProbeProtocol::Http));
        assert_eq!(probe.properties.request_path.as_deref(), Some("/healthz"));
        assert_eq!(probe.properties.port, Some(80));
    }

    #[test]
    fn test_update_missing_rule_fails() {
        let mut lb = balancer();
        assert!(matches!(
            lb.update_load_balancing_rule("nope").err(),
            Some(NetworkError::ChildNotFound { .. })
        ));
    }
}

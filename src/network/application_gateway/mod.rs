//! Application gateways
//!
//! An application gateway owns nine child collections that refer to each
//! other by id: listeners point at frontends, frontend ports, and SSL
//! certificates; request routing rules point at listeners, backends, and
//! backend HTTP configurations; backend HTTP configurations point at probes.
//! References to children removed before submission are cleared by
//! [`Aggregate::clean_dangling_references`].

mod backend;
mod frontend;
mod http_configuration;
mod ip_configuration;
mod listener;
mod probe;
mod rule;
mod ssl_certificate;

pub use backend::{Backend, BackendAddress, BackendProperties};
pub use frontend::{Frontend, FrontendPort, FrontendPortProperties};
pub use http_configuration::{
    BackendHttpConfiguration, BackendHttpConfigurationProperties, ConnectionDraining,
};
pub use ip_configuration::{IpConfiguration, IpConfigurationProperties};
pub use listener::{Listener, ListenerProperties};
pub use probe::{Probe, ProbeMatch, ProbeProperties};
pub use rule::{RequestRoutingRule, RequestRoutingRuleProperties};
pub use ssl_certificate::{SslCertificate, SslCertificateProperties};

use super::models::FrontendIpProperties;
use super::random_resource_name;
use crate::error::{NetworkError, Result};
use crate::resource::{
    has_children, same_name, Aggregate, Child, ChildBuilder, DeferredCollection, ResourceInner,
    ResourceScope,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name given to the IP configuration and private frontend when none is specified
pub const DEFAULT: &str = "default";
/// Name given to the public frontend when none is specified
pub const DEFAULT_PUBLIC_FRONTEND: &str = "public";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationGatewaySku {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl ApplicationGatewaySku {
    /// `Standard_Small` -> tier `Standard`; v2 SKUs are their own tier.
    pub fn new(name: &str, capacity: u32) -> Self {
        let tier = if name.to_ascii_lowercase().ends_with("_v2") {
            name.to_string()
        } else {
            name.split('_').next().unwrap_or(name).to_string()
        };
        Self {
            name: Some(name.to_string()),
            tier: Some(tier),
            capacity: Some(capacity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationGatewayProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<ApplicationGatewaySku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(rename = "gatewayIPConfigurations", skip_serializing_if = "Option::is_none")]
    pub gateway_ip_configurations: Option<Vec<IpConfiguration>>,
    #[serde(rename = "frontendIPConfigurations", skip_serializing_if = "Option::is_none")]
    pub frontend_ip_configurations: Option<Vec<Frontend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_ports: Option<Vec<FrontendPort>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_address_pools: Option<Vec<Backend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_http_settings_collection: Option<Vec<BackendHttpConfiguration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_listeners: Option<Vec<Listener>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_routing_rules: Option<Vec<RequestRoutingRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_certificates: Option<Vec<SslCertificate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<Vec<Probe>>,
}

/// An application gateway and its child collections
#[derive(Debug, Clone)]
pub struct ApplicationGateway {
    scope: ResourceScope,
    inner: ResourceInner<ApplicationGatewayProperties>,
    ip_configs: DeferredCollection<IpConfigurationProperties>,
    frontends: DeferredCollection<FrontendIpProperties>,
    frontend_ports: DeferredCollection<FrontendPortProperties>,
    backends: DeferredCollection<BackendProperties>,
    backend_http_configs: DeferredCollection<BackendHttpConfigurationProperties>,
    listeners: DeferredCollection<ListenerProperties>,
    rules: DeferredCollection<RequestRoutingRuleProperties>,
    ssl_certs: DeferredCollection<SslCertificateProperties>,
    probes: DeferredCollection<ProbeProperties>,
}

has_children!(ApplicationGateway {
    ip_configs: IpConfigurationProperties,
    frontends: FrontendIpProperties,
    frontend_ports: FrontendPortProperties,
    backends: BackendProperties,
    backend_http_configs: BackendHttpConfigurationProperties,
    listeners: ListenerProperties,
    rules: RequestRoutingRuleProperties,
    ssl_certs: SslCertificateProperties,
    probes: ProbeProperties,
});

impl Aggregate for ApplicationGateway {
    type Properties = ApplicationGatewayProperties;
    const KIND: &'static str = "application-gateways";
    const DISPLAY: &'static str = "application gateway";

    fn from_parts(scope: ResourceScope, mut inner: ResourceInner<ApplicationGatewayProperties>) -> Self {
        let p = &mut inner.properties;
        let ip_configs = DeferredCollection::from_wire(p.gateway_ip_configurations.take());
        let frontends = DeferredCollection::from_wire(p.frontend_ip_configurations.take());
        let frontend_ports = DeferredCollection::from_wire(p.frontend_ports.take());
        let backends = DeferredCollection::from_wire(p.backend_address_pools.take());
        let backend_http_configs = DeferredCollection::from_wire(p.backend_http_settings_collection.take());
        let listeners = DeferredCollection::from_wire(p.http_listeners.take());
        let rules = DeferredCollection::from_wire(p.request_routing_rules.take());
        let ssl_certs = DeferredCollection::from_wire(p.ssl_certificates.take());
        let probes = DeferredCollection::from_wire(p.probes.take());

        Self {
            scope,
            inner,
            ip_configs,
            frontends,
            frontend_ports,
            backends,
            backend_http_configs,
            listeners,
            rules,
            ssl_certs,
            probes,
        }
    }

    fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    fn inner(&self) -> &ResourceInner<ApplicationGatewayProperties> {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut ResourceInner<ApplicationGatewayProperties> {
        &mut self.inner
    }

    fn clean_dangling_references(&mut self) -> usize {
        let orphaned: Vec<String> = self
            .frontends
            .iter()
            .filter(|f| !f.properties.is_public() && !f.properties.is_private())
            .map(|f| f.name.clone())
            .collect();
        for name in orphaned {
            tracing::debug!("Dropping frontend '{}' with neither a public IP nor a subnet", name);
            self.frontends.remove(&name);
        }

        let mut cleared = 0;

        for listener in self.listeners.iter_mut() {
            let p = &mut listener.properties;
            cleared += self.frontends.clear_dangling(&mut p.frontend_ip_configuration) as usize;
            cleared += self.frontend_ports.clear_dangling(&mut p.frontend_port) as usize;
            cleared += self.ssl_certs.clear_dangling(&mut p.ssl_certificate) as usize;
        }

        for rule in self.rules.iter_mut() {
            let p = &mut rule.properties;
            cleared += self.backends.clear_dangling(&mut p.backend_address_pool) as usize;
            cleared += self.backend_http_configs.clear_dangling(&mut p.backend_http_settings) as usize;
            cleared += self.listeners.clear_dangling(&mut p.http_listener) as usize;
        }

        for config in self.backend_http_configs.iter_mut() {
            cleared += self.probes.clear_dangling(&mut config.properties.probe) as usize;
        }

        cleared
    }

    fn collect_children(&self, p: &mut ApplicationGatewayProperties) {
        p.gateway_ip_configurations = Some(self.ip_configs.to_wire());
        p.frontend_ip_configurations = Some(self.frontends.to_wire());
        p.frontend_ports = Some(self.frontend_ports.to_wire());
        p.backend_address_pools = Some(self.backends.to_wire());
        p.backend_http_settings_collection = Some(self.backend_http_configs.to_wire());
        p.http_listeners = Some(self.listeners.to_wire());
        p.request_routing_rules = Some(self.rules.to_wire());
        p.ssl_certificates = Some(self.ssl_certs.to_wire());
        p.probes = Some(self.probes.to_wire());
        p.operational_state = None;
        p.provisioning_state = None;
    }

    fn validate(&self) -> Result<()> {
        if self.inner.location.as_deref().unwrap_or("").is_empty() {
            return Err(NetworkError::missing(self.label(), "location"));
        }
        if self.ip_configs.is_empty() {
            return Err(NetworkError::missing(self.label(), "gatewayIPConfigurations"));
        }
        for config in self.ip_configs.iter() {
            if config.properties.subnet.is_none() {
                return Err(NetworkError::missing(
                    format!("IP configuration '{}'", config.name),
                    "subnet",
                ));
            }
        }
        for cert in self.ssl_certs.iter() {
            if cert.id.is_none() && cert.properties.data.is_none() {
                return Err(NetworkError::missing(
                    format!("SSL certificate '{}'", cert.name),
                    "data",
                ));
            }
        }
        Ok(())
    }
}

impl ApplicationGateway {
    // Getters

    pub fn sku(&self) -> Option<&ApplicationGatewaySku> {
        self.inner.properties.sku.as_ref()
    }

    pub fn operational_state(&self) -> Option<&str> {
        self.inner.properties.operational_state.as_deref()
    }

    pub fn ip_configurations(&self) -> &DeferredCollection<IpConfigurationProperties> {
        &self.ip_configs
    }

    pub fn frontends(&self) -> &DeferredCollection<FrontendIpProperties> {
        &self.frontends
    }

    pub fn backends(&self) -> &DeferredCollection<BackendProperties> {
        &self.backends
    }

    pub fn backend_http_configurations(&self) -> &DeferredCollection<BackendHttpConfigurationProperties> {
        &self.backend_http_configs
    }

    pub fn frontend_listeners(&self) -> &DeferredCollection<ListenerProperties> {
        &self.listeners
    }

    pub fn request_routing_rules(&self) -> &DeferredCollection<RequestRoutingRuleProperties> {
        &self.rules
    }

    pub fn ssl_certificates(&self) -> &DeferredCollection<SslCertificateProperties> {
        &self.ssl_certs
    }

    pub fn probes(&self) -> &DeferredCollection<ProbeProperties> {
        &self.probes
    }

    /// Frontend port numbers by port name
    pub fn frontend_ports(&self) -> BTreeMap<String, u16> {
        self.frontend_ports
            .iter()
            .filter_map(|p| p.properties.port.map(|n| (p.name.clone(), n)))
            .collect()
    }

    pub fn frontend_port_name_from_number(&self, port: u16) -> Option<&str> {
        self.frontend_ports
            .iter()
            .find(|p| p.properties.port == Some(port))
            .map(|p| p.name.as_str())
    }

    /// Port number a listener listens on, resolved through its frontend port reference
    pub fn listener_port_number(&self, listener: &Listener) -> Option<u16> {
        let reference = listener.properties.frontend_port.as_ref()?;
        self.frontend_ports.resolve(reference).ok()??.properties.port
    }

    pub fn frontend_listener_by_port_number(&self, port: u16) -> Option<&Listener> {
        self.listeners
            .iter()
            .find(|l| self.listener_port_number(l) == Some(port))
    }

    pub fn is_public(&self) -> bool {
        self.frontends.iter().any(|f| f.properties.is_public())
    }

    pub fn is_private(&self) -> bool {
        self.frontends.iter().any(|f| f.properties.is_private())
    }

    // Withers

    pub fn with_sku(&mut self, name: &str, capacity: u32) -> &mut Self {
        self.inner.properties.sku = Some(ApplicationGatewaySku::new(name, capacity));
        self
    }

    /// Place the gateway in a subnet through the default IP configuration.
    pub fn with_containing_subnet(&mut self, network_id: &str, subnet_name: &str) -> Result<&mut Self> {
        Ok(self
            .define_ip_configuration(DEFAULT)
            .with_containing_subnet(network_id, subnet_name)?
            .attach())
    }

    /// Expose the gateway on an existing public IP through the public frontend.
    pub fn with_existing_public_ip_address(&mut self, public_ip_id: &str) -> &mut Self {
        let name = self
            .frontends
            .iter()
            .find(|f| f.properties.is_public())
            .map(|f| f.name.clone())
            .unwrap_or_else(|| DEFAULT_PUBLIC_FRONTEND.to_string());

        self.define_public_frontend(&name)
            .with_existing_public_ip_address(public_ip_id)
            .attach()
    }

    /// Enable a private frontend in the subnet the gateway is deployed into.
    ///
    /// The subnet is taken from the default IP configuration, or the first one
    /// if there is no default.
    pub fn with_private_frontend(&mut self) -> Result<&mut Self> {
        let config = self
            .ip_configs
            .get(DEFAULT)
            .or_else(|| self.ip_configs.iter().next())
            .ok_or_else(|| NetworkError::NoIpConfiguration(self.label()))?;

        let subnet = config.properties.subnet.clone().ok_or_else(|| {
            NetworkError::missing(format!("IP configuration '{}'", config.name), "subnet")
        })?;
        let network_id = subnet.parent_id()?.to_string();
        let subnet_name = subnet.name()?.to_string();

        Ok(self
            .define_private_frontend(DEFAULT)
            .with_existing_subnet(&network_id, &subnet_name)?
            .attach())
    }

    /// Add a frontend port, or confirm an equivalent one exists.
    ///
    /// A port found by both name and number must be the same port. A number
    /// already taken under another name, or a name already bound to another
    /// number, is a conflict. Without a name the port is auto-named.
    pub fn with_frontend_port(&mut self, port: u16, name: Option<&str>) -> Result<&mut Self> {
        let by_name = name
            .and_then(|n| self.frontend_ports.get(n))
            .map(|p| p.name.clone());
        let by_port = self.frontend_port_name_from_number(port).map(str::to_string);

        match (by_name, by_port) {
            (Some(named), Some(numbered)) if same_name(&named, &numbered) => Ok(self),
            (Some(_), Some(existing)) => Err(NetworkError::PortConflict { port, existing }),
            // The name is taken by a port with another number
            (Some(existing), None) => Err(NetworkError::PortConflict { port, existing }),
            (None, Some(existing)) => match name {
                None => Ok(self),
                Some(_) => Err(NetworkError::PortConflict { port, existing }),
            },
            (None, None) => {
                let name = name
                    .map(str::to_string)
                    .unwrap_or_else(|| random_resource_name("port", 9));
                let mut child = Child::<FrontendPortProperties>::new(name);
                child.properties.port = Some(port);
                self.frontend_ports.attach(child);
                Ok(self)
            }
        }
    }

    pub fn without_frontend_port(&mut self, name: &str) -> &mut Self {
        self.frontend_ports.remove(name);
        self
    }

    pub fn without_frontend_port_number(&mut self, port: u16) -> &mut Self {
        self.frontend_ports.retain(|p| p.properties.port != Some(port));
        self
    }

    pub fn without_private_frontend(&mut self) -> &mut Self {
        self.frontends.retain(|f| !f.properties.is_private());
        self
    }

    pub fn without_public_frontend(&mut self) -> &mut Self {
        self.frontends.retain(|f| !f.properties.is_public());
        self
    }

    /// Remove an IP address from every backend.
    pub fn without_backend_ip_address(&mut self, ip_address: &str) -> &mut Self {
        for backend in self.backends.iter_mut() {
            backend.properties.remove_ip_address(ip_address);
        }
        self
    }

    /// Remove an FQDN from every backend.
    pub fn without_backend_fqdn(&mut self, fqdn: &str) -> &mut Self {
        for backend in self.backends.iter_mut() {
            backend.properties.remove_fqdn(fqdn);
        }
        self
    }

    // Child definitions

    pub fn define_ip_configuration(&mut self, name: &str) -> ChildBuilder<'_, Self, IpConfigurationProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_public_frontend(&mut self, name: &str) -> ChildBuilder<'_, Self, FrontendIpProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_private_frontend(&mut self, name: &str) -> ChildBuilder<'_, Self, FrontendIpProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_backend(&mut self, name: &str) -> ChildBuilder<'_, Self, BackendProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_backend_http_configuration(
        &mut self,
        name: &str,
    ) -> ChildBuilder<'_, Self, BackendHttpConfigurationProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_frontend_listener(&mut self, name: &str) -> ChildBuilder<'_, Self, ListenerProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_request_routing_rule(
        &mut self,
        name: &str,
    ) -> ChildBuilder<'_, Self, RequestRoutingRuleProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_ssl_certificate(&mut self, name: &str) -> ChildBuilder<'_, Self, SslCertificateProperties> {
        ChildBuilder::define(self, name)
    }

    pub fn define_probe(&mut self, name: &str) -> ChildBuilder<'_, Self, ProbeProperties> {
        ChildBuilder::define(self, name)
    }

    // Child updates

    pub fn update_ip_configuration(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, IpConfigurationProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_frontend(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, FrontendIpProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_backend(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, BackendProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_backend_http_configuration(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, BackendHttpConfigurationProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_frontend_listener(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, ListenerProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_request_routing_rule(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, RequestRoutingRuleProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_ssl_certificate(
        &mut self,
        name: &str,
    ) -> Result<ChildBuilder<'_, Self, SslCertificateProperties>> {
        ChildBuilder::update(self, name)
    }

    pub fn update_probe(&mut self, name: &str) -> Result<ChildBuilder<'_, Self, ProbeProperties>> {
        ChildBuilder::update(self, name)
    }

    // Child removal

    pub fn without_ip_configuration(&mut self, name: &str) -> &mut Self {
        self.ip_configs.remove(name);
        self
    }

    pub fn without_frontend(&mut self, name: &str) -> &mut Self {
        self.frontends.remove(name);
        self
    }

    pub fn without_backend(&mut self, name: &str) -> &mut Self {
        self.backends.remove(name);
        self
    }

    pub fn without_backend_http_configuration(&mut self, name: &str) -> &mut Self {
        self.backend_http_configs.remove(name);
        self
    }

    pub fn without_frontend_listener(&mut self, name: &str) -> &mut Self {
        self.listeners.remove(name);
        self
    }

    pub fn without_request_routing_rule(&mut self, name: &str) -> &mut Self {
        self.rules.remove(name);
        self
    }

    pub fn without_ssl_certificate(&mut self, name: &str) -> &mut Self {
        self.ssl_certs.remove(name);
        self
    }

    pub fn without_probe(&mut self, name: &str) -> &mut Self {
        self.probes.remove(name);
        self
    }
}

//! Enumerations and small value types shared by the network resource models

use serde::{Deserialize, Serialize};

/// Application protocol of a gateway listener, backend setting, or probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Http,
    Https,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpAllocationMethod {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookieBasedAffinity {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestRoutingRuleType {
    Basic,
    PathBasedRouting,
}

/// Transport protocol of load balancing and inbound NAT rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportProtocol {
    Tcp,
    Udp,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeProtocol {
    Tcp,
    Http,
    Https,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDistribution {
    Default,
    SourceIP,
    SourceIPProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleProtocol {
    Tcp,
    Udp,
    Icmp,
    #[serde(rename = "*")]
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleAccess {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteNextHopType {
    VirtualNetworkGateway,
    VnetLocal,
    Internet,
    VirtualAppliance,
    None,
}

/// Frontend IP settings shared by gateway and load balancer frontends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendIpProperties {
    #[serde(rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(rename = "privateIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub private_ip_allocation_method: Option<IpAllocationMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<crate::resource::SubResource>,
    #[serde(rename = "publicIPAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<crate::resource::SubResource>,
}

impl FrontendIpProperties {
    pub fn is_public(&self) -> bool {
        self.public_ip_address.is_some()
    }

    pub fn is_private(&self) -> bool {
        self.subnet.is_some()
    }

    /// Id of the virtual network containing the frontend's subnet
    pub fn network_id(&self) -> Option<&str> {
        self.subnet.as_ref().and_then(|s| s.parent_id().ok())
    }

    pub fn subnet_name(&self) -> Option<&str> {
        self.subnet.as_ref().and_then(|s| s.name().ok())
    }

    pub fn public_ip_address_id(&self) -> Option<&str> {
        self.public_ip_address.as_ref().map(|r| r.id.as_str())
    }

    /// Point at a subnet of an existing network; the frontend becomes private.
    pub(crate) fn set_subnet(&mut self, network_id: &str, subnet_name: &str) -> crate::error::Result<()> {
        let subnet_id = crate::resource::build_child_id(network_id, "subnets", subnet_name)?;
        self.subnet = Some(crate::resource::SubResource::new(subnet_id));
        self.public_ip_address = None;
        Ok(())
    }

    /// Point at an existing public IP; the frontend becomes public.
    pub(crate) fn set_public_ip(&mut self, public_ip_id: &str) {
        self.public_ip_address = Some(crate::resource::SubResource::new(public_ip_id));
        self.subnet = None;
        self.private_ip_address = None;
        self.private_ip_allocation_method = None;
    }

    pub(crate) fn set_static_ip(&mut self, ip: &str) {
        self.private_ip_address = Some(ip.to_string());
        self.private_ip_allocation_method = Some(IpAllocationMethod::Static);
    }

    pub(crate) fn set_dynamic_ip(&mut self) {
        self.private_ip_address = None;
        self.private_ip_allocation_method = Some(IpAllocationMethod::Dynamic);
    }
}

/// Port range in the form the service expects: `"80"` or `"8000-8080"`
pub fn port_range(from: u16, to: u16) -> String {
    if from == to {
        from.to_string()
    } else {
        format!("{}-{}", from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(SecurityRuleProtocol::Any).unwrap(), "*");
        assert_eq!(serde_json::to_value(RouteNextHopType::VnetLocal).unwrap(), "VnetLocal");
        assert_eq!(serde_json::to_value(LoadDistribution::SourceIP).unwrap(), "SourceIP");
    }

    #[test]
    fn test_port_range() {
        assert_eq!(port_range(80, 80), "80");
        assert_eq!(port_range(8000, 8080), "8000-8080");
    }

    #[test]
    fn test_frontend_switches_between_public_and_private() {
        let mut f = FrontendIpProperties::default();
        assert!(!f.is_public() && !f.is_private());

        let vnet = "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/vnet";
        f.set_subnet(vnet, "default").unwrap();
        assert!(f.is_private());
        assert_eq!(f.network_id(), Some(vnet));
        assert_eq!(f.subnet_name(), Some("default"));

        f.set_static_ip("10.0.0.4");
        f.set_public_ip("/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/publicIPAddresses/pip");
        assert!(f.is_public());
        assert!(!f.is_private());
        assert!(f.private_ip_address.is_none());
    }

    #[test]
    fn test_frontend_wire_names() {
        let mut f = FrontendIpProperties::default();
        f.set_static_ip("10.0.0.4");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"privateIPAddress": "10.0.0.4", "privateIPAllocationMethod": "Static"})
        );
    }
}

use super::ApplicationGateway;
use crate::error::Result;
use crate::network::models::FrontendIpProperties;
use crate::resource::{Child, ChildBuilder, ChildProperties};
use serde::{Deserialize, Serialize};

impl ChildProperties for FrontendIpProperties {
    const TYPE_SEGMENT: &'static str = "frontendIPConfigurations";
    const KIND: &'static str = "frontend";
}

pub type Frontend = Child<FrontendIpProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendPortProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for FrontendPortProperties {
    const TYPE_SEGMENT: &'static str = "frontendPorts";
    const KIND: &'static str = "frontend port";
}

pub type FrontendPort = Child<FrontendPortProperties>;

impl<'a> ChildBuilder<'a, ApplicationGateway, FrontendIpProperties> {
    /// Make the frontend private, in a subnet of an existing network.
    pub fn with_existing_subnet(mut self, network_id: &str, subnet_name: &str) -> Result<Self> {
        self.properties_mut().set_subnet(network_id, subnet_name)?;
        Ok(self)
    }

    /// Make the frontend public, on an existing public IP address.
    pub fn with_existing_public_ip_address(mut self, public_ip_id: &str) -> Self {
        self.properties_mut().set_public_ip(public_ip_id);
        self
    }

    pub fn with_private_ip_address_static(mut self, ip_address: &str) -> Self {
        self.properties_mut().set_static_ip(ip_address);
        self
    }

    pub fn with_private_ip_address_dynamic(mut self) -> Self {
        self.properties_mut().set_dynamic_ip();
        self
    }
}

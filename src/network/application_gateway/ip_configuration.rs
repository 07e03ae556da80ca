use super::ApplicationGateway;
use crate::error::Result;
use crate::resource::{build_child_id, Child, ChildBuilder, ChildProperties, SubResource};
use serde::{Deserialize, Serialize};

/// Subnet placement of the gateway's instances
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpConfigurationProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for IpConfigurationProperties {
    const TYPE_SEGMENT: &'static str = "gatewayIPConfigurations";
    const KIND: &'static str = "IP configuration";
}

pub type IpConfiguration = Child<IpConfigurationProperties>;

impl IpConfiguration {
    pub fn network_id(&self) -> Option<&str> {
        self.properties.subnet.as_ref().and_then(|s| s.parent_id().ok())
    }

    pub fn subnet_name(&self) -> Option<&str> {
        self.properties.subnet.as_ref().and_then(|s| s.name().ok())
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, IpConfigurationProperties> {
    pub fn with_containing_subnet(mut self, network_id: &str, subnet_name: &str) -> Result<Self> {
        let subnet_id = build_child_id(network_id, "subnets", subnet_name)?;
        self.properties_mut().subnet = Some(SubResource::new(subnet_id));
        Ok(self)
    }
}

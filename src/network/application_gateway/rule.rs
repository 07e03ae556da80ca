use super::{
    ApplicationGateway, BackendHttpConfigurationProperties, BackendProperties, ListenerProperties,
};
use crate::error::Result;
use crate::network::models::RequestRoutingRuleType;
use crate::network::random_resource_name;
use crate::resource::{Aggregate, Child, ChildBuilder, ChildProperties, SubResource};
use serde::{Deserialize, Serialize};

/// Routes traffic from a listener to a backend using a backend HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestRoutingRuleProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RequestRoutingRuleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_address_pool: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_http_settings: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_listener: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Default for RequestRoutingRuleProperties {
    fn default() -> Self {
        Self {
            rule_type: Some(RequestRoutingRuleType::Basic),
            backend_address_pool: None,
            backend_http_settings: None,
            http_listener: None,
            provisioning_state: None,
        }
    }
}

impl ChildProperties for RequestRoutingRuleProperties {
    const TYPE_SEGMENT: &'static str = "requestRoutingRules";
    const KIND: &'static str = "request routing rule";
}

pub type RequestRoutingRule = Child<RequestRoutingRuleProperties>;

impl RequestRoutingRule {
    pub fn listener_name(&self) -> Option<&str> {
        self.properties.http_listener.as_ref().and_then(|r| r.name().ok())
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.properties.backend_address_pool.as_ref().and_then(|r| r.name().ok())
    }

    pub fn backend_http_configuration_name(&self) -> Option<&str> {
        self.properties.backend_http_settings.as_ref().and_then(|r| r.name().ok())
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, RequestRoutingRuleProperties> {
    pub fn from_listener(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<ListenerProperties>(name)?;
        self.properties_mut().http_listener = Some(reference);
        Ok(self)
    }

    /// Route to a backend by name, adding an empty backend if there is none.
    pub fn to_backend(mut self, name: &str) -> Result<Self> {
        if !self.parent().backends().contains(name) {
            self.parent_mut().define_backend(name).attach();
        }
        let reference = self.parent().reference_to::<BackendProperties>(name)?;
        self.properties_mut().backend_address_pool = Some(reference);
        Ok(self)
    }

    /// Add an IP address to the rule's backend, creating an auto-named backend if needed.
    pub fn to_backend_ip_address(self, ip_address: &str) -> Result<Self> {
        let existing = self
            .child()
            .backend_name()
            .filter(|name| self.parent().backends().contains(name))
            .map(str::to_string);
        let name = existing.unwrap_or_else(|| random_resource_name("backend", 12));

        let mut builder = self.to_backend(&name)?;
        builder
            .parent_mut()
            .define_backend(&name)
            .with_ip_address(ip_address)
            .attach();
        Ok(builder)
    }

    pub fn to_backend_http_configuration(mut self, name: &str) -> Result<Self> {
        let reference = self
            .parent()
            .reference_to::<BackendHttpConfigurationProperties>(name)?;
        self.properties_mut().backend_http_settings = Some(reference);
        Ok(self)
    }

    /// Use the backend HTTP configuration for `port`, adding an auto-named one if needed.
    pub fn to_backend_http_port(mut self, port: u16) -> Result<Self> {
        let existing = self
            .parent()
            .backend_http_configurations()
            .iter()
            .find(|c| c.properties.port == Some(port))
            .map(|c| c.name.clone());

        let name = match existing {
            Some(name) => name,
            None => {
                let name = random_resource_name("config", 12);
                self.parent_mut()
                    .define_backend_http_configuration(&name)
                    .with_port(port)
                    .attach();
                name
            }
        };
        self.to_backend_http_configuration(&name)
    }

    pub fn with_rule_type_basic(mut self) -> Self {
        self.properties_mut().rule_type = Some(RequestRoutingRuleType::Basic);
        self
    }
}

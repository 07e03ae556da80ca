use super::{ApplicationGateway, FrontendPortProperties, SslCertificateProperties};
use crate::error::{NetworkError, Result};
use crate::network::models::{FrontendIpProperties, Protocol};
use crate::resource::{Aggregate, Child, ChildBuilder, ChildProperties, SubResource};
use serde::{Deserialize, Serialize};

/// HTTP(S) listener bound to a frontend and a frontend port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListenerProperties {
    #[serde(rename = "frontendIPConfiguration", skip_serializing_if = "Option::is_none")]
    pub frontend_ip_configuration: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend_port: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_server_name_indication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for ListenerProperties {
    const TYPE_SEGMENT: &'static str = "httpListeners";
    const KIND: &'static str = "frontend listener";
}

pub type Listener = Child<ListenerProperties>;

impl Listener {
    pub fn frontend_name(&self) -> Option<&str> {
        self.properties.frontend_ip_configuration.as_ref().and_then(|r| r.name().ok())
    }

    pub fn frontend_port_name(&self) -> Option<&str> {
        self.properties.frontend_port.as_ref().and_then(|r| r.name().ok())
    }

    pub fn ssl_certificate_name(&self) -> Option<&str> {
        self.properties.ssl_certificate.as_ref().and_then(|r| r.name().ok())
    }

    pub fn requires_server_name_indication(&self) -> bool {
        self.properties.require_server_name_indication.unwrap_or(false)
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, ListenerProperties> {
    /// Bind to a frontend of the same gateway by name.
    pub fn with_frontend(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<FrontendIpProperties>(name)?;
        self.properties_mut().frontend_ip_configuration = Some(reference);
        Ok(self)
    }

    /// Listen on a port number, adding an auto-named frontend port if needed.
    pub fn with_frontend_port(mut self, port: u16) -> Result<Self> {
        self.parent_mut().with_frontend_port(port, None)?;
        let name = self
            .parent()
            .frontend_port_name_from_number(port)
            .map(str::to_string)
            .ok_or_else(|| NetworkError::ChildNotFound {
                kind: FrontendPortProperties::KIND,
                name: port.to_string(),
            })?;
        self.with_frontend_port_name(&name)
    }

    /// Listen on an existing frontend port by name.
    pub fn with_frontend_port_name(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<FrontendPortProperties>(name)?;
        self.properties_mut().frontend_port = Some(reference);
        Ok(self)
    }

    pub fn with_ssl_certificate(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<SslCertificateProperties>(name)?;
        self.properties_mut().ssl_certificate = Some(reference);
        Ok(self)
    }

    pub fn with_http(mut self) -> Self {
        self.properties_mut().protocol = Some(Protocol::Http);
        self
    }

    pub fn with_https(mut self) -> Self {
        self.properties_mut().protocol = Some(Protocol::Https);
        self
    }

    pub fn with_host_name(mut self, host_name: &str) -> Self {
        self.properties_mut().host_name = Some(host_name.to_string());
        self
    }

    pub fn with_server_name_indication(mut self) -> Self {
        self.properties_mut().require_server_name_indication = Some(true);
        self
    }

    pub fn without_server_name_indication(mut self) -> Self {
        self.properties_mut().require_server_name_indication = Some(false);
        self
    }
}

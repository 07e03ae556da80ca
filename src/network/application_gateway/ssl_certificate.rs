use super::ApplicationGateway;
use crate::resource::{Child, ChildBuilder, ChildProperties};
use serde::{Deserialize, Serialize};

/// PFX certificate used by HTTPS listeners
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SslCertificateProperties {
    /// Base64-encoded PFX; write-only on the service side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_cert_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for SslCertificateProperties {
    const TYPE_SEGMENT: &'static str = "sslCertificates";
    const KIND: &'static str = "SSL certificate";
}

pub type SslCertificate = Child<SslCertificateProperties>;

impl SslCertificate {
    pub fn public_data(&self) -> Option<&str> {
        self.properties.public_cert_data.as_deref()
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, SslCertificateProperties> {
    pub fn with_data(mut self, base64_pfx: &str) -> Self {
        self.properties_mut().data = Some(base64_pfx.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.properties_mut().password = Some(password.to_string());
        self
    }
}

use super::{ApplicationGateway, ProbeProperties};
use crate::error::{NetworkError, Result};
use crate::network::models::{CookieBasedAffinity, Protocol};
use crate::resource::{Aggregate, Child, ChildBuilder, ChildProperties, SubResource};
use serde::{Deserialize, Serialize};

/// Port used by a backend HTTP configuration unless set otherwise
pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDraining {
    pub enabled: bool,
    pub drain_timeout_in_sec: u32,
}

/// How the gateway talks to its backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendHttpConfigurationProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_based_affinity: Option<CookieBasedAffinity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity_cookie_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_host_name_from_backend_address: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_draining: Option<ConnectionDraining>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Default for BackendHttpConfigurationProperties {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            protocol: Some(Protocol::Http),
            cookie_based_affinity: None,
            affinity_cookie_name: None,
            request_timeout: None,
            probe: None,
            host_name: None,
            pick_host_name_from_backend_address: None,
            path: None,
            connection_draining: None,
            provisioning_state: None,
        }
    }
}

impl ChildProperties for BackendHttpConfigurationProperties {
    const TYPE_SEGMENT: &'static str = "backendHttpSettingsCollection";
    const KIND: &'static str = "backend HTTP configuration";
}

pub type BackendHttpConfiguration = Child<BackendHttpConfigurationProperties>;

impl BackendHttpConfiguration {
    pub fn probe_name(&self) -> Option<&str> {
        self.properties.probe.as_ref().and_then(|p| p.name().ok())
    }

    pub fn cookie_based_affinity(&self) -> bool {
        self.properties.cookie_based_affinity == Some(CookieBasedAffinity::Enabled)
    }
}

/// `"api"` -> `"/api/"`; backend paths carry both slashes.
fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    normalized.push_str(path);
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

impl<'a> ChildBuilder<'a, ApplicationGateway, BackendHttpConfigurationProperties> {
    pub fn with_port(mut self, port: u16) -> Self {
        self.properties_mut().port = Some(port);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.properties_mut().protocol = Some(protocol);
        self
    }

    pub fn with_cookie_based_affinity(mut self) -> Self {
        self.properties_mut().cookie_based_affinity = Some(CookieBasedAffinity::Enabled);
        self
    }

    pub fn without_cookie_based_affinity(mut self) -> Self {
        self.properties_mut().cookie_based_affinity = Some(CookieBasedAffinity::Disabled);
        self
    }

    pub fn with_affinity_cookie_name(mut self, name: &str) -> Self {
        self.properties_mut().affinity_cookie_name = Some(name.to_string());
        self
    }

    pub fn with_request_timeout(mut self, seconds: u32) -> Self {
        self.properties_mut().request_timeout = Some(seconds);
        self
    }

    /// Associate a probe of the same gateway by name.
    pub fn with_probe(mut self, name: &str) -> Result<Self> {
        let reference = self.parent().reference_to::<ProbeProperties>(name)?;
        self.properties_mut().probe = Some(reference);
        Ok(self)
    }

    pub fn without_probe(mut self) -> Self {
        self.properties_mut().probe = None;
        self
    }

    pub fn with_host_header(mut self, host: &str) -> Self {
        let p = self.properties_mut();
        p.host_name = Some(host.to_string());
        p.pick_host_name_from_backend_address = Some(false);
        self
    }

    pub fn with_host_header_from_backend(mut self) -> Self {
        let p = self.properties_mut();
        p.host_name = None;
        p.pick_host_name_from_backend_address = Some(true);
        self
    }

    pub fn without_host_header(mut self) -> Self {
        let p = self.properties_mut();
        p.host_name = None;
        p.pick_host_name_from_backend_address = Some(false);
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.properties_mut().path = Some(normalize_path(path));
        self
    }

    pub fn without_path(mut self) -> Self {
        self.properties_mut().path = None;
        self
    }

    /// Drain connections for `seconds` (1 to 3600) when a backend is removed.
    pub fn with_connection_draining(mut self, seconds: u32) -> Result<Self> {
        if !(1..=3600).contains(&seconds) {
            return Err(NetworkError::invalid(
                "drainTimeoutInSec",
                format!("{} is outside 1..=3600", seconds),
            ));
        }
        self.properties_mut().connection_draining = Some(ConnectionDraining {
            enabled: true,
            drain_timeout_in_sec: seconds,
        });
        Ok(self)
    }

    pub fn without_connection_draining(mut self) -> Self {
        self.properties_mut().connection_draining = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("api"), "/api/");
        assert_eq!(normalize_path("/api"), "/api/");
        assert_eq!(normalize_path("api/"), "/api/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_defaults() {
        let config = BackendHttpConfiguration::new("cfg");
        assert_eq!(config.properties.port, Some(DEFAULT_PORT));
        assert_eq!(config.properties.protocol, Some(Protocol::Http));
        assert!(!config.cookie_based_affinity());
    }
}

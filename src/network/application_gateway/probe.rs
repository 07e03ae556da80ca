use super::ApplicationGateway;
use crate::error::{NetworkError, Result};
use crate::network::models::Protocol;
use crate::resource::{Child, ChildBuilder, ChildProperties};
use serde::{Deserialize, Serialize};

/// What a healthy probe response looks like
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_codes: Option<Vec<String>>,
}

impl ProbeMatch {
    fn is_empty(&self) -> bool {
        self.body.is_none() && self.status_codes.as_ref().map_or(true, Vec::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProbeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<u32>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub response_match: Option<ProbeMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Default for ProbeProperties {
    fn default() -> Self {
        Self {
            protocol: Some(Protocol::Http),
            host: None,
            path: None,
            interval: Some(30),
            timeout: Some(30),
            unhealthy_threshold: Some(3),
            response_match: None,
            provisioning_state: None,
        }
    }
}

impl ChildProperties for ProbeProperties {
    const TYPE_SEGMENT: &'static str = "probes";
    const KIND: &'static str = "probe";
}

pub type Probe = Child<ProbeProperties>;

impl Probe {
    pub fn healthy_http_response_status_code_ranges(&self) -> Vec<&str> {
        self.properties
            .response_match
            .iter()
            .flat_map(|m| m.status_codes.iter().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn healthy_http_response_body_contents(&self) -> Option<&str> {
        self.properties.response_match.as_ref()?.body.as_deref()
    }
}

impl ProbeProperties {
    fn response_match_mut(&mut self) -> &mut ProbeMatch {
        self.response_match.get_or_insert_with(ProbeMatch::default)
    }

    fn drop_empty_match(&mut self) {
        if self.response_match.as_ref().is_some_and(ProbeMatch::is_empty) {
            self.response_match = None;
        }
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, ProbeProperties> {
    pub fn with_host(mut self, host: &str) -> Self {
        self.properties_mut().host = Some(host.to_string());
        self
    }

    /// Request path, always starting with `/`
    pub fn with_path(mut self, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        self.properties_mut().path = Some(path);
        self
    }

    pub fn with_http(mut self) -> Self {
        self.properties_mut().protocol = Some(Protocol::Http);
        self
    }

    pub fn with_https(mut self) -> Self {
        self.properties_mut().protocol = Some(Protocol::Https);
        self
    }

    pub fn with_time_between_probes_in_seconds(mut self, seconds: u32) -> Self {
        self.properties_mut().interval = Some(seconds);
        self
    }

    pub fn with_timeout_in_seconds(mut self, seconds: u32) -> Self {
        self.properties_mut().timeout = Some(seconds);
        self
    }

    pub fn with_retries_before_unhealthy(mut self, retries: u32) -> Self {
        self.properties_mut().unhealthy_threshold = Some(retries);
        self
    }

    /// Accept `from..=to` as healthy status codes, recorded as `"from-to"`.
    /// The service checks the codes themselves; only a reversed range is refused here.
    pub fn with_healthy_http_response_status_code_range(mut self, from: u16, to: u16) -> Result<Self> {
        if to < from {
            return Err(NetworkError::invalid(
                "statusCodes",
                format!("{}-{} is not a valid HTTP status code range", from, to),
            ));
        }

        let range = format!("{}-{}", from, to);
        let codes = self
            .properties_mut()
            .response_match_mut()
            .status_codes
            .get_or_insert_with(Vec::new);
        if !codes.contains(&range) {
            codes.push(range);
        }
        Ok(self)
    }

    pub fn with_healthy_http_response_status_code(self, code: u16) -> Result<Self> {
        self.with_healthy_http_response_status_code_range(code, code)
    }

    pub fn without_healthy_http_response_status_code_ranges(mut self) -> Self {
        let p = self.properties_mut();
        if let Some(m) = p.response_match.as_mut() {
            m.status_codes = None;
        }
        p.drop_empty_match();
        self
    }

    /// Require the response body to contain `text`; an empty string clears the requirement.
    pub fn with_healthy_http_response_body_contents(mut self, text: &str) -> Self {
        let p = self.properties_mut();
        if text.is_empty() {
            if let Some(m) = p.response_match.as_mut() {
                m.body = None;
            }
        } else {
            p.response_match_mut().body = Some(text.to_string());
        }
        p.drop_empty_match();
        self
    }
}

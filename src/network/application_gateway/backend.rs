use super::ApplicationGateway;
use crate::resource::{Child, ChildBuilder, ChildProperties, SubResource};
use serde::{Deserialize, Serialize};

/// One backend target, by IP address or by FQDN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_addresses: Option<Vec<BackendAddress>>,
    #[serde(rename = "backendIPConfigurations", skip_serializing_if = "Option::is_none")]
    pub backend_ip_configurations: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl ChildProperties for BackendProperties {
    const TYPE_SEGMENT: &'static str = "backendAddressPools";
    const KIND: &'static str = "backend";
}

impl BackendProperties {
    fn add_address(&mut self, address: BackendAddress) {
        let addresses = self.backend_addresses.get_or_insert_with(Vec::new);
        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }

    pub(crate) fn add_ip_address(&mut self, ip_address: &str) {
        self.add_address(BackendAddress {
            fqdn: None,
            ip_address: Some(ip_address.to_string()),
        });
    }

    pub(crate) fn add_fqdn(&mut self, fqdn: &str) {
        self.add_address(BackendAddress {
            fqdn: Some(fqdn.to_string()),
            ip_address: None,
        });
    }

    pub(crate) fn remove_ip_address(&mut self, ip_address: &str) {
        if let Some(addresses) = self.backend_addresses.as_mut() {
            addresses.retain(|a| a.ip_address.as_deref() != Some(ip_address));
        }
    }

    pub(crate) fn remove_fqdn(&mut self, fqdn: &str) {
        if let Some(addresses) = self.backend_addresses.as_mut() {
            addresses.retain(|a| !a.fqdn.as_deref().is_some_and(|f| f.eq_ignore_ascii_case(fqdn)));
        }
    }
}

pub type Backend = Child<BackendProperties>;

impl Backend {
    pub fn ip_addresses(&self) -> Vec<&str> {
        self.addresses().filter_map(|a| a.ip_address.as_deref()).collect()
    }

    pub fn fqdns(&self) -> Vec<&str> {
        self.addresses().filter_map(|a| a.fqdn.as_deref()).collect()
    }

    pub fn contains_ip_address(&self, ip_address: &str) -> bool {
        self.ip_addresses().contains(&ip_address)
    }

    pub fn contains_fqdn(&self, fqdn: &str) -> bool {
        self.fqdns().iter().any(|f| f.eq_ignore_ascii_case(fqdn))
    }

    fn addresses(&self) -> impl Iterator<Item = &BackendAddress> {
        self.properties.backend_addresses.iter().flatten()
    }
}

impl<'a> ChildBuilder<'a, ApplicationGateway, BackendProperties> {
    pub fn with_ip_address(mut self, ip_address: &str) -> Self {
        self.properties_mut().add_ip_address(ip_address);
        self
    }

    pub fn with_fqdn(mut self, fqdn: &str) -> Self {
        self.properties_mut().add_fqdn(fqdn);
        self
    }

    pub fn without_ip_address(mut self, ip_address: &str) -> Self {
        self.properties_mut().remove_ip_address(ip_address);
        self
    }

    pub fn without_fqdn(mut self, fqdn: &str) -> Self {
        self.properties_mut().remove_fqdn(fqdn);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_unique() {
        let mut p = BackendProperties::default();
        p.add_ip_address("10.0.0.1");
        p.add_ip_address("10.0.0.1");
        p.add_fqdn("www.contoso.com");

        let mut backend = Backend::new("pool");
        backend.properties = p;
        assert_eq!(backend.ip_addresses(), vec!["10.0.0.1"]);
        assert!(backend.contains_fqdn("WWW.contoso.com"));

        backend.properties.remove_fqdn("www.CONTOSO.com");
        assert!(backend.fqdns().is_empty());
        assert!(backend.contains_ip_address("10.0.0.1"));
    }
}

//! Network resource models
//!
//! Concrete aggregates built on [`crate::resource`], and the
//! [`NetworkManager`] entry point that binds them to a [`Transport`].

pub mod application_gateway;
pub mod load_balancer;
pub mod models;
pub mod route_table;
pub mod security_group;
pub mod virtual_network;

pub use application_gateway::ApplicationGateway;
pub use load_balancer::LoadBalancer;
pub use route_table::RouteTable;
pub use security_group::NetworkSecurityGroup;
pub use virtual_network::Network;

use crate::error::Result;
use crate::resource::{fetcher, Aggregate, ResourceInner, ResourceScope, Transport};
use uuid::Uuid;

/// `prefix` followed by random hex, at most `max_len` characters in total
pub(crate) fn random_resource_name(prefix: &str, max_len: usize) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let take = max_len.saturating_sub(prefix.len()).min(suffix.len());
    format!("{}{}", prefix, &suffix[..take])
}

/// Entry point for defining, fetching, and submitting network resources
pub struct NetworkManager<T> {
    transport: T,
}

impl<T: Transport> NetworkManager<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn subscription_id(&self) -> &str {
        self.transport.subscription_id()
    }

    /// Start an empty aggregate of kind `A`; nothing is sent until [`Self::create`].
    pub fn define<A: Aggregate>(&self, resource_group: &str, name: &str) -> A {
        let scope = ResourceScope::new(self.subscription_id(), resource_group, name);
        A::from_parts(scope, ResourceInner::default())
    }

    pub fn define_application_gateway(&self, resource_group: &str, name: &str) -> ApplicationGateway {
        self.define(resource_group, name)
    }

    pub fn define_load_balancer(&self, resource_group: &str, name: &str) -> LoadBalancer {
        self.define(resource_group, name)
    }

    pub fn define_network(&self, resource_group: &str, name: &str) -> Network {
        self.define(resource_group, name)
    }

    pub fn define_network_security_group(&self, resource_group: &str, name: &str) -> NetworkSecurityGroup {
        self.define(resource_group, name)
    }

    pub fn define_route_table(&self, resource_group: &str, name: &str) -> RouteTable {
        self.define(resource_group, name)
    }

    pub async fn get<A: Aggregate>(&self, resource_group: &str, name: &str) -> Result<A> {
        fetcher::get(&self.transport, resource_group, name).await
    }

    pub async fn list<A: Aggregate>(&self, resource_group: &str) -> Result<Vec<A>> {
        fetcher::list(&self.transport, resource_group).await
    }

    /// Create or update; on success the aggregate reflects the service's response.
    pub async fn create<A: Aggregate>(&self, resource: &mut A) -> Result<()> {
        fetcher::create_or_update(&self.transport, resource).await
    }

    pub async fn refresh<A: Aggregate>(&self, resource: &mut A) -> Result<()> {
        fetcher::refresh(&self.transport, resource).await
    }

    pub async fn delete<A: Aggregate>(&self, resource_group: &str, name: &str) -> Result<()> {
        fetcher::delete::<A>(&self.transport, resource_group, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_resource_name() {
        let name = random_resource_name("port", 9);
        assert!(name.starts_with("port"));
        assert_eq!(name.len(), 9);
        assert_ne!(name, random_resource_name("port", 9));

        assert_eq!(random_resource_name("toolongprefix", 4), "toolongprefix");
    }
}

//! Behaviour of deferred child collections through a real aggregate
//!
//! An application gateway is wired up locally, children are removed, and the
//! tree handed to the transport is checked for stale references.

use tarm::network::application_gateway::{
    ApplicationGateway, BackendAddress, BackendProperties, RequestRoutingRule,
};
use tarm::network::LoadBalancer;
use tarm::resource::{
    Aggregate, BuildMode, Child, DeferredCollection, ResourceInner, ResourceScope,
};

const VNET: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet";

fn gateway() -> ApplicationGateway {
    let mut gw = ApplicationGateway::from_parts(ResourceScope::new("sub", "rg", "gw"), ResourceInner::default());
    gw.with_region("westus")
        .with_sku("Standard_Small", 1)
        .with_containing_subnet(VNET, "gateway")
        .unwrap();
    gw
}

fn wired_gateway() -> ApplicationGateway {
    let mut gw = gateway();
    gw.define_backend("pool1").with_ip_address("10.0.0.4").attach();
    gw.define_frontend_listener("listener1")
        .with_frontend_port(80)
        .unwrap()
        .with_http()
        .attach();
    gw.define_request_routing_rule("rule1")
        .from_listener("listener1")
        .unwrap()
        .to_backend("pool1")
        .unwrap()
        .to_backend_http_port(8080)
        .unwrap()
        .attach();
    gw
}

fn address(ip: &str) -> BackendAddress {
    BackendAddress {
        fqdn: None,
        ip_address: Some(ip.to_string()),
    }
}

fn rule(gw: &ApplicationGateway) -> &RequestRoutingRule {
    gw.request_routing_rules().get("rule1").unwrap()
}

#[test]
fn test_removed_backend_is_cleared_before_submission() {
    let mut gw = wired_gateway();
    let stale = rule(&gw).properties.backend_address_pool.clone().unwrap();
    assert!(stale.id.ends_with("/applicationGateways/gw/backendAddressPools/pool1"));

    gw.without_backend("pool1");

    // The stored reference resolves to nothing but is still present until submission
    assert!(matches!(gw.backends().resolve(&stale), Ok(None)));
    assert!(rule(&gw).properties.backend_address_pool.is_some());

    let wire = gw.to_wire().unwrap();
    let rules = wire.properties.request_routing_rules.as_ref().unwrap();
    assert_eq!(rules.len(), 1);
    assert!(rules[0].properties.backend_address_pool.is_none());
    assert!(rules[0].properties.http_listener.is_some());

    let body = serde_json::to_string(&wire).unwrap();
    assert!(!body.contains("backendAddressPools/pool1"));
}

#[test]
fn test_cleanup_is_silent_and_counts_repairs() {
    let mut gw = wired_gateway();
    gw.without_backend("pool1").without_frontend_listener("listener1");
    assert_eq!(gw.clean_dangling_references(), 2);
    assert_eq!(gw.clean_dangling_references(), 0);
    assert!(gw.to_wire().is_ok());
}

#[test]
fn test_removing_listener_port_clears_listener_reference() {
    let mut gw = wired_gateway();
    let port_name = gw.frontend_port_name_from_number(80).unwrap().to_string();
    gw.without_frontend_port(&port_name);

    let wire = gw.to_wire().unwrap();
    let listeners = wire.properties.http_listeners.unwrap();
    assert!(listeners[0].properties.frontend_port.is_none());
}

#[test]
fn test_last_attach_wins() {
    let mut pools = DeferredCollection::<BackendProperties>::new();

    let (mut first, mode) = pools.stage("pool");
    assert_eq!(mode, BuildMode::Define);
    let (mut second, _) = pools.stage("POOL");
    first.properties.backend_addresses = Some(vec![address("10.0.0.1")]);
    second.properties.backend_addresses = Some(vec![address("10.0.0.2")]);

    pools.attach(first);
    let replaced = pools.attach(second);
    assert!(replaced.is_some());

    assert_eq!(pools.len(), 1);
    let pool = pools.get("pool").unwrap();
    assert_eq!(pool.ip_addresses(), vec!["10.0.0.2"]);
}

#[test]
fn test_redefining_through_the_aggregate_overwrites() {
    let mut gw = gateway();
    gw.define_backend_http_configuration("http").with_port(8080).attach();
    gw.define_backend_http_configuration("HTTP").with_port(9090).attach();

    let configs = gw.backend_http_configurations();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs.get("http").unwrap().properties.port, Some(9090));
    // Redefinition starts from the attached child, so its spelling is kept
    assert_eq!(configs.names().collect::<Vec<_>>(), vec!["http"]);
}

#[test]
fn test_unattached_definition_leaves_no_trace() {
    let mut gw = gateway();
    {
        let builder = gw.define_backend("ghost").with_fqdn("ghost.example.com");
        assert_eq!(builder.mode(), BuildMode::Define);
        drop(builder);
    }
    assert!(!gw.backends().contains("ghost"));

    let wire = gw.to_wire().unwrap();
    assert_eq!(wire.properties.backend_address_pools, Some(vec![]));
}

#[test]
fn test_rebuild_discards_unsubmitted_children() {
    let mut gw = gateway();
    gw.define_backend("c1").attach();

    let mut persisted = gateway();
    persisted.define_backend("c2").with_ip_address("10.0.0.9").attach();
    let response = persisted.to_wire().unwrap();

    gw.set_inner(response);
    let names: Vec<&str> = gw.backends().names().collect();
    assert_eq!(names, vec!["c2"]);
    assert_eq!(gw.backends().get("c2").unwrap().ip_addresses(), vec!["10.0.0.9"]);
}

#[test]
fn test_rebuild_from_wire_on_a_bare_collection() {
    let mut pools = DeferredCollection::<BackendProperties>::new();
    pools.attach(Child::new("c1"));
    pools.attach(Child::new("c2"));

    let wire: Vec<Child<BackendProperties>> = vec![pools.get("c2").unwrap().clone()];
    pools.rebuild_from_wire(Some(wire));
    assert!(!pools.contains("c1"));
    assert!(pools.contains("c2"));

    pools.rebuild_from_wire(None);
    assert!(pools.is_empty());
}

#[test]
fn test_load_balancer_rule_loses_removed_probe() {
    let mut lb = LoadBalancer::from_parts(ResourceScope::new("sub", "rg", "lb"), ResourceInner::default());
    lb.with_region("westus");
    lb.define_public_frontend("fe")
        .with_existing_public_ip_address(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/publicIPAddresses/pip",
        )
        .attach();
    lb.define_backend("be").attach();
    lb.define_tcp_probe("tcp").with_port(22).attach();
    lb.define_load_balancing_rule("ssh")
        .from_frontend("fe")
        .unwrap()
        .from_frontend_port(22)
        .to_backend("be")
        .unwrap()
        .with_probe("tcp")
        .unwrap()
        .attach();

    lb.without_probe("tcp");
    let wire = lb.to_wire().unwrap();
    let rules = wire.properties.load_balancing_rules.unwrap();
    assert!(rules[0].properties.probe.is_none());
    assert!(rules[0].properties.frontend_ip_configuration.is_some());
    assert_eq!(rules[0].properties.backend_port, Some(22));
}

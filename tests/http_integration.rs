//! Integration tests for the ARM client using wiremock
//!
//! These tests drive the lifecycle verbs end to end against a mocked
//! management endpoint: what is sent on create, how responses rebuild child
//! collections, pagination, and status handling.

use serde_json::{json, Value};
use tarm::arm::auth::ArmCredentials;
use tarm::arm::client::ArmClient;
use tarm::arm::http::format_arm_error;
use tarm::network::{ApplicationGateway, NetworkManager, RouteTable};
use tarm::resource::{Aggregate, Transport};
use tarm::NetworkError;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUB: &str = "00000000-0000-0000-0000-000000000001";
const GW_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/rg/providers/Microsoft.Network/applicationGateways/gw";
const RT_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/rg/providers/Microsoft.Network/routeTables";
const VNET: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet";

fn manager(server: &MockServer) -> NetworkManager<ArmClient> {
    let client = ArmClient::new(SUB, &server.uri(), ArmCredentials::from_token("test-token"))
        .expect("client should build");
    NetworkManager::new(client)
}

fn child_id(kind: &str, name: &str) -> String {
    format!("{}/{}/{}", GW_PATH, kind, name)
}

/// A gateway as the service would report it
fn persisted_gateway() -> Value {
    json!({
        "id": GW_PATH,
        "name": "gw",
        "type": "Microsoft.Network/applicationGateways",
        "location": "westus",
        "etag": "W/\"1\"",
        "properties": {
            "provisioningState": "Succeeded",
            "operationalState": "Running",
            "sku": {"name": "Standard_Small", "tier": "Standard", "capacity": 1},
            "gatewayIPConfigurations": [{
                "id": child_id("gatewayIPConfigurations", "default"),
                "name": "default",
                "properties": {"subnet": {"id": format!("{}/subnets/gateway", VNET)}}
            }],
            "frontendPorts": [{
                "id": child_id("frontendPorts", "port80"),
                "name": "port80",
                "properties": {"port": 80}
            }],
            "backendAddressPools": [{
                "id": child_id("backendAddressPools", "Pool1"),
                "name": "Pool1",
                "properties": {"backendAddresses": [{"ipAddress": "10.0.0.4"}]}
            }],
            "httpListeners": [{
                "id": child_id("httpListeners", "listener1"),
                "name": "listener1",
                "properties": {
                    "protocol": "Http",
                    "frontendPort": {"id": child_id("frontendPorts", "port80")}
                }
            }],
            "requestRoutingRules": [{
                "id": child_id("requestRoutingRules", "rule1"),
                "name": "rule1",
                "properties": {
                    "ruleType": "Basic",
                    "httpListener": {"id": child_id("httpListeners", "listener1")},
                    "backendAddressPool": {"id": child_id("backendAddressPools", "pool1")}
                }
            }]
        }
    })
}

mod lifecycle_tests {
    use super::*;

    /// GET rebuilds every child collection and references resolve case-insensitively
    #[tokio::test]
    async fn test_get_rebuilds_collections() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GW_PATH))
            .and(query_param("api-version", "2019-06-01"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(persisted_gateway()))
            .mount(&server)
            .await;

        let gw: ApplicationGateway = manager(&server).get("rg", "gw").await.unwrap();

        assert_eq!(gw.id(), Some(GW_PATH));
        assert_eq!(gw.region_name(), Some("westus"));
        assert_eq!(gw.operational_state(), Some("Running"));
        assert_eq!(gw.frontend_ports().get("port80"), Some(&80));
        assert_eq!(gw.frontend_listener_by_port_number(80).map(|l| l.name()), Some("listener1"));

        let rule = gw.request_routing_rules().get("rule1").unwrap();
        let pool = rule.properties.backend_address_pool.as_ref().unwrap();
        let resolved = gw.backends().resolve(pool).unwrap().unwrap();
        assert_eq!(resolved.name(), "Pool1");
    }

    /// PUT carries the normalized tree and the response replaces local state
    #[tokio::test]
    async fn test_create_sends_normalized_tree() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(GW_PATH))
            .and(query_param("api-version", "2019-06-01"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(persisted_gateway()))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager(&server);
        let mut gw = manager.define_application_gateway("rg", "gw");
        gw.with_region("westus")
            .with_sku("Standard_Small", 1)
            .with_containing_subnet(VNET, "gateway")
            .unwrap();
        gw.define_backend("doomed").with_ip_address("10.0.0.9").attach();
        gw.define_frontend_listener("listener1")
            .with_frontend_port(80)
            .unwrap()
            .attach();
        gw.define_request_routing_rule("rule1")
            .from_listener("listener1")
            .unwrap()
            .to_backend("doomed")
            .unwrap()
            .attach();
        gw.without_backend("doomed");

        manager.create(&mut gw).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = requests[0].body_json().unwrap();
        let rule = &body["properties"]["requestRoutingRules"][0];
        assert_eq!(rule["name"], "rule1");
        assert!(rule["properties"].get("backendAddressPool").is_none());
        assert!(rule["properties"]["httpListener"]["id"]
            .as_str()
            .unwrap()
            .ends_with("/applicationGateways/gw/httpListeners/listener1"));
        assert_eq!(body["name"], "gw");
        assert!(!body.to_string().contains("doomed"));

        // State now mirrors the response, not what was defined locally
        assert_eq!(gw.id(), Some(GW_PATH));
        assert!(gw.backends().contains("pool1"));
        assert!(!gw.backends().contains("doomed"));
    }

    /// Incomplete definitions fail before anything is sent
    #[tokio::test]
    async fn test_create_validates_locally() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let manager = manager(&server);
        let mut gw = manager.define_application_gateway("rg", "gw");
        gw.with_region("westus");

        let err = manager.create(&mut gw).await.unwrap_err();
        assert!(matches!(
            err,
            NetworkError::MissingField { field: "gatewayIPConfigurations", .. }
        ));
        assert!(!err.is_transport());
    }

    /// Refresh discards children that were never submitted
    #[tokio::test]
    async fn test_refresh_discards_local_changes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(persisted_gateway()))
            .mount(&server)
            .await;

        let manager = manager(&server);
        let mut gw: ApplicationGateway = manager.get("rg", "gw").await.unwrap();
        gw.define_probe("local-only").attach();
        gw.without_request_routing_rule("rule1");

        manager.refresh(&mut gw).await.unwrap();
        assert!(gw.probes().is_empty());
        assert!(gw.request_routing_rules().contains("rule1"));
    }

    /// List follows nextLink until the last page
    #[tokio::test]
    async fn test_list_follows_next_link() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RT_PATH))
            .and(query_param("api-version", "2019-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": format!("{}/rt1", RT_PATH), "name": "rt1", "location": "westus"},
                    {"id": format!("{}/rt2", RT_PATH), "name": "rt2", "location": "westus"}
                ],
                "nextLink": format!("{}/page2?api-version=2019-06-01", server.uri())
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "id": format!("{}/rt3", RT_PATH),
                    "name": "rt3",
                    "location": "westus",
                    "properties": {
                        "routes": [{"name": "r1", "properties": {"addressPrefix": "0.0.0.0/0", "nextHopType": "Internet"}}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let tables: Vec<RouteTable> = manager(&server).list("rg").await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["rt1", "rt2", "rt3"]);
        assert_eq!(tables[2].routes().len(), 1);
        assert_eq!(tables[2].resource_group_name(), "rg");
    }

    /// Delete succeeds on 202 and on a resource that is already gone
    #[tokio::test]
    async fn test_delete_tolerates_missing_resource() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(GW_PATH))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}2", GW_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let manager = manager(&server);
        manager.delete::<ApplicationGateway>("rg", "gw").await.unwrap();
        manager.delete::<ApplicationGateway>("rg", "gw2").await.unwrap();
    }
}

mod status_tests {
    use super::*;

    async fn get_with_status(status: u16, body: Value) -> NetworkError {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(GW_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        manager(&server)
            .get::<ApplicationGateway>("rg", "gw")
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_404_is_a_transport_error() {
        let err = get_with_status(
            404,
            json!({"error": {"code": "ResourceNotFound", "message": "not here"}}),
        )
        .await;
        assert!(err.is_transport());
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("ResourceNotFound"));

        let NetworkError::Transport(inner) = err else {
            panic!("expected a transport error");
        };
        assert_eq!(format_arm_error(&inner), "Resource not found.");
    }

    #[tokio::test]
    async fn test_403_maps_to_permission_hint() {
        let err = get_with_status(403, json!({"error": {"code": "AuthorizationFailed"}})).await;
        let NetworkError::Transport(inner) = err else {
            panic!("expected a transport error");
        };
        assert!(format_arm_error(&inner).starts_with("Permission denied"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_decode_error() {
        let err = get_with_status(200, json!({"properties": {"sku": "not-an-object"}})).await;
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_foreign_next_link_is_refused() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [],
                "nextLink": "https://elsewhere.example.com/page2"
            })))
            .mount(&server)
            .await;

        let err = manager(&server)
            .list::<RouteTable>("rg")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_transport_is_usable_as_trait_object() {
        let server = MockServer::start().await;
        let manager = manager(&server);
        let transport: &dyn Transport = manager.transport();
        assert_eq!(transport.subscription_id(), SUB);
    }
}

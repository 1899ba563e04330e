//! Discovery responses in the Envoy v1 REST API shapes (SDS, CDS, LDS, RDS).

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};

use super::registry::{AggregateRegistry, PortProtocol, Service, ServiceInstance};
use super::store::{ConfigEntry, ConfigSnapshot};
use crate::config::{HarnessArgs, MeshConfig};

/// Config kinds that carry routing rules.
pub const ROUTE_RULE_KINDS: [&str; 2] = ["RouteRule", "VirtualService"];

/// Config kind carrying per-destination connection limits.
pub const DESTINATION_POLICY_KIND: &str = "DestinationPolicy";

/// `simpleCb` fields and their v1 circuit breaker names.
const CIRCUIT_BREAKER_FIELDS: [(&str, &str); 4] = [
    ("maxConnections", "max_connections"),
    ("httpMaxPendingRequests", "max_pending_requests"),
    ("httpMaxRequests", "max_requests"),
    ("httpMaxRetries", "max_retries"),
];

/// Route config name of the HTTP proxy listener.
pub const HTTP_PROXY_ROUTE: &str = "http_proxy";

/// Cluster the proxy fetches route tables from.
const RDS_CLUSTER: &str = "rds";

/// Parsed `hostname|port-name[|k=v,...]` service key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceKey {
    pub hostname: String,
    pub port_name: String,
    pub labels: BTreeMap<String, String>,
}

impl ServiceKey {
    pub fn new(hostname: &str, port_name: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            port_name: port_name.to_string(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.splitn(3, '|');
        let hostname = parts.next().filter(|h| !h.is_empty())?;
        let port_name = parts.next()?;
        let mut labels = BTreeMap::new();
        if let Some(spec) = parts.next().filter(|s| !s.is_empty()) {
            for pair in spec.split(',') {
                let (k, v) = pair.split_once('=')?;
                labels.insert(k.to_string(), v.to_string());
            }
        }
        Some(Self {
            hostname: hostname.to_string(),
            port_name: port_name.to_string(),
            labels,
        })
    }

    /// Outbound cluster name for this key.
    pub fn cluster_name(&self) -> String {
        format!("out.{self}")
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.hostname, self.port_name)?;
        if !self.labels.is_empty() {
            let labels: Vec<String> = self.labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "|{}", labels.join(","))?;
        }
        Ok(())
    }
}

/// Builds discovery responses from the registry and the config snapshot.
pub struct XdsBuilder<'a> {
    pub args: &'a HarnessArgs,
    pub registry: &'a AggregateRegistry,
    pub config: &'a ConfigSnapshot,
}

impl XdsBuilder<'_> {
    fn mesh(&self) -> &MeshConfig {
        &self.args.mesh_config
    }

    fn hosts(instances: &[ServiceInstance]) -> Vec<Value> {
        instances
            .iter()
            .map(|i| {
                json!({
                    "ip_address": i.address,
                    "port": i.port,
                    "tags": i.labels,
                })
            })
            .collect()
    }

    /// Hosts of one service key (SDS).
    pub fn registration(&self, key: &ServiceKey) -> Value {
        let instances: Vec<ServiceInstance> = self
            .registry
            .instances(&key.hostname, &key.port_name)
            .into_iter()
            .filter(|i| i.matches(&key.labels))
            .collect();
        json!({ "hosts": Self::hosts(&instances) })
    }

    /// Every service key with its hosts.
    pub fn registrations(&self) -> Value {
        let mut out = Vec::new();
        for service in self.registry.services() {
            for port in &service.ports {
                let instances = self.registry.instances(&service.hostname, &port.name);
                out.push(json!({
                    "service-key": ServiceKey::new(&service.hostname, &port.name).to_string(),
                    "hosts": Self::hosts(&instances),
                }));
            }
        }
        Value::Array(out)
    }

    /// Outbound clusters (CDS): one per service port plus one per label
    /// subset referenced by a route rule.
    pub fn clusters(&self) -> Value {
        let connect_timeout_ms = self.mesh().connect_timeout.as_millis() as u64;
        let mut clusters = Vec::new();

        for service in self.registry.services() {
            let subsets = self.route_subsets(&service);
            let breakers = self.circuit_breakers(&service);
            for port in &service.ports {
                let base = ServiceKey::new(&service.hostname, &port.name);
                let keys = std::iter::once(base.clone())
                    .chain(subsets.iter().map(|labels| base.clone().with_labels(labels.clone())));
                for key in keys {
                    let mut cluster = json!({
                        "name": key.cluster_name(),
                        "service_name": key.to_string(),
                        "connect_timeout_ms": connect_timeout_ms,
                        "type": "sds",
                        "lb_type": "round_robin",
                    });
                    if port.protocol.is_http2() {
                        cluster["features"] = json!("http2");
                    }
                    if let Some(breakers) = &breakers {
                        cluster["circuit_breakers"] = json!({ "default": breakers });
                    }
                    clusters.push(cluster);
                }
            }
        }

        clusters.push(json!({
            "name": RDS_CLUSTER,
            "connect_timeout_ms": connect_timeout_ms,
            "type": "strict_dns",
            "lb_type": "round_robin",
            "hosts": [{ "url": format!("tcp://localhost:{}", self.args.discovery.http_port) }],
        }));

        json!({ "clusters": clusters })
    }

    /// Listeners (LDS): one per distinct service port, the virtual listener,
    /// and the HTTP proxy listener when enabled.
    pub fn listeners(&self) -> Value {
        let mut ports: BTreeMap<u16, PortProtocol> = BTreeMap::new();
        let mut tcp_clusters: BTreeMap<u16, String> = BTreeMap::new();
        for service in self.registry.services() {
            for port in &service.ports {
                ports.entry(port.port).or_insert(port.protocol);
                if !port.protocol.is_http() {
                    tcp_clusters
                        .entry(port.port)
                        .or_insert_with(|| ServiceKey::new(&service.hostname, &port.name).cluster_name());
                }
            }
        }

        let mut listeners = Vec::new();
        for (port, protocol) in &ports {
            let listener = if protocol.is_http() {
                self.http_listener(&format!("http_0.0.0.0_{port}"), *port, &port.to_string(), false)
            } else {
                let cluster = tcp_clusters.get(port).cloned().unwrap_or_default();
                json!({
                    "name": format!("tcp_0.0.0.0_{port}"),
                    "address": format!("tcp://0.0.0.0:{port}"),
                    "bind_to_port": false,
                    "filters": [{
                        "type": "read",
                        "name": "tcp_proxy",
                        "config": {
                            "stat_prefix": "tcp",
                            "route_config": { "routes": [{ "cluster": cluster }] },
                        },
                    }],
                })
            };
            listeners.push(listener);
        }

        listeners.push(json!({
            "name": "virtual",
            "address": format!("tcp://0.0.0.0:{}", self.mesh().proxy_listen_port),
            "bind_to_port": true,
            "use_original_dst": true,
            "filters": [],
        }));

        if self.mesh().http_proxy_enabled() {
            listeners.push(self.http_listener(
                HTTP_PROXY_ROUTE,
                self.mesh().proxy_http_port,
                HTTP_PROXY_ROUTE,
                true,
            ));
        }

        json!({ "listeners": listeners })
    }

    fn http_listener(&self, name: &str, port: u16, route_config: &str, bind: bool) -> Value {
        let mut filters = Vec::new();
        if !self.args.mesh.mixer_address.is_empty() {
            filters.push(json!({
                "type": "decoder",
                "name": "mixer",
                "config": { "mixer_server": self.args.mesh.mixer_address },
            }));
        }
        filters.push(json!({ "type": "decoder", "name": "router", "config": {} }));

        json!({
            "name": name,
            "address": format!("tcp://0.0.0.0:{port}"),
            "bind_to_port": bind,
            "filters": [{
                "type": "read",
                "name": "http_connection_manager",
                "config": {
                    "codec_type": "auto",
                    "stat_prefix": "http",
                    "rds": {
                        "cluster": RDS_CLUSTER,
                        "route_config_name": route_config,
                        "refresh_delay_ms": self.args.mesh.rds_refresh_delay.as_millis() as u64,
                    },
                    "filters": filters,
                },
            }],
        })
    }

    /// Route table (RDS) for `route_config`: a port number, or the HTTP
    /// proxy route. Unknown names yield an empty table.
    pub fn routes(&self, route_config: &str) -> Value {
        let wanted_port: Option<u16> = route_config.parse().ok();
        let proxy_route = route_config == HTTP_PROXY_ROUTE;

        let mut virtual_hosts = Vec::new();
        for service in self.registry.services() {
            for port in service.ports.iter().filter(|p| p.protocol.is_http()) {
                let domains = if proxy_route {
                    vec![format!("{}:{}", service.hostname, port.port)]
                } else if wanted_port == Some(port.port) {
                    domains(&service, port.port)
                } else {
                    continue;
                };

                let key = ServiceKey::new(&service.hostname, &port.name);
                virtual_hosts.push(json!({
                    "name": format!("{}:{}", service.hostname, port.port),
                    "domains": domains,
                    "routes": [self.route(&service, &key)],
                }));
            }
        }

        json!({ "validate_clusters": false, "virtual_hosts": virtual_hosts })
    }

    fn route(&self, service: &Service, key: &ServiceKey) -> Value {
        let Some(rule) = self.route_rule(service) else {
            return json!({ "prefix": "/", "cluster": key.cluster_name() });
        };

        let destinations = rule_destinations(rule);
        if destinations.is_empty() {
            return json!({ "prefix": "/", "cluster": key.cluster_name() });
        }
        let single = destinations.len() == 1;
        let clusters: Vec<Value> = destinations
            .into_iter()
            .map(|(labels, weight)| {
                json!({
                    "name": key.clone().with_labels(labels).cluster_name(),
                    "weight": weight.unwrap_or(if single { 100 } else { 0 }),
                })
            })
            .collect();
        json!({ "prefix": "/", "weighted_clusters": { "clusters": clusters } })
    }

    /// The route rule applying to `service`: highest precedence, then name.
    fn route_rule(&self, service: &Service) -> Option<&ConfigEntry> {
        self.config
            .of_kind(&ROUTE_RULE_KINDS)
            .filter(|entry| rule_targets(entry, service))
            .max_by(|a, b| {
                precedence(a)
                    .cmp(&precedence(b))
                    .then_with(|| b.name.cmp(&a.name))
            })
    }

    /// Limits from the first `DestinationPolicy` naming `service`.
    fn circuit_breakers(&self, service: &Service) -> Option<Value> {
        let kinds = [DESTINATION_POLICY_KIND];
        let simple_cb = self
            .config
            .of_kind(&kinds)
            .filter(|entry| {
                entry.spec["destination"]["name"]
                    .as_str()
                    .is_some_and(|host| names_service(host, service))
            })
            .find_map(|entry| entry.spec["circuitBreaker"]["simpleCb"].as_object())?;

        let limits: serde_json::Map<String, Value> = CIRCUIT_BREAKER_FIELDS
            .iter()
            .filter_map(|(from, to)| {
                simple_cb
                    .get(*from)
                    .and_then(Value::as_u64)
                    .map(|limit| (to.to_string(), json!(limit)))
            })
            .collect();
        (!limits.is_empty()).then_some(Value::Object(limits))
    }

    fn route_subsets(&self, service: &Service) -> BTreeSet<BTreeMap<String, String>> {
        self.config
            .of_kind(&ROUTE_RULE_KINDS)
            .filter(|entry| rule_targets(entry, service))
            .flat_map(rule_destinations)
            .map(|(labels, _)| labels)
            .filter(|labels| !labels.is_empty())
            .collect()
    }
}

fn domains(service: &Service, port: u16) -> Vec<String> {
    let short = service.short_name();
    vec![
        service.hostname.clone(),
        format!("{}:{port}", service.hostname),
        short.to_string(),
        format!("{short}:{port}"),
    ]
}

fn names_service(host: &str, service: &Service) -> bool {
    host == service.hostname || host == service.short_name()
}

fn rule_targets(entry: &ConfigEntry, service: &Service) -> bool {
    match entry.kind.as_str() {
        "RouteRule" => entry.spec["destination"]["name"]
            .as_str()
            .is_some_and(|host| names_service(host, service)),
        "VirtualService" => entry.spec["hosts"].as_array().is_some_and(|hosts| {
            hosts
                .iter()
                .filter_map(Value::as_str)
                .any(|host| names_service(host, service))
        }),
        _ => false,
    }
}

fn precedence(entry: &ConfigEntry) -> i64 {
    entry.spec["precedence"].as_i64().unwrap_or(0)
}

/// Label selectors and weights of a rule's destinations.
///
/// `RouteRule` lists `route[].labels`; `VirtualService` lists
/// `http[0].route[].destination.subset`, mapped to a `version` label.
fn rule_destinations(entry: &ConfigEntry) -> Vec<(BTreeMap<String, String>, Option<u64>)> {
    let routes = match entry.kind.as_str() {
        "RouteRule" => &entry.spec["route"],
        _ => &entry.spec["http"][0]["route"],
    };
    let Some(routes) = routes.as_array() else {
        return Vec::new();
    };

    routes
        .iter()
        .map(|route| {
            let labels = if entry.kind == "RouteRule" {
                route["labels"]
                    .as_object()
                    .map(|labels| {
                        labels
                            .iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect()
                    })
                    .unwrap_or_default()
            } else {
                route["destination"]["subset"]
                    .as_str()
                    .map(|subset| BTreeMap::from([("version".to_string(), subset.to_string())]))
                    .unwrap_or_default()
            };
            (labels, route["weight"].as_u64())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HarnessConfig, HarnessPorts};
    use std::path::PathBuf;

    fn args() -> HarnessArgs {
        HarnessArgs::new(&HarnessConfig::default(), &HarnessPorts::fixed())
    }

    fn registry() -> AggregateRegistry {
        AggregateRegistry::from_names(&["Mock".to_string()]).unwrap()
    }

    fn entry(kind: &str, name: &str, spec: Value) -> ConfigEntry {
        ConfigEntry {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: "testing".to_string(),
            spec,
            source: PathBuf::from("test.yaml"),
        }
    }

    fn snapshot(entries: Vec<ConfigEntry>) -> ConfigSnapshot {
        ConfigSnapshot {
            entries,
            ..Default::default()
        }
    }

    #[test]
    fn test_service_key_round_trip() {
        let key = ServiceKey::parse("hello.default.svc.cluster.local|http|version=v1").unwrap();
        assert_eq!(key.hostname, "hello.default.svc.cluster.local");
        assert_eq!(key.port_name, "http");
        assert_eq!(key.labels["version"], "v1");
        assert_eq!(key.to_string(), "hello.default.svc.cluster.local|http|version=v1");
        assert_eq!(
            key.cluster_name(),
            "out.hello.default.svc.cluster.local|http|version=v1"
        );

        assert!(ServiceKey::parse("hello").is_none());
        assert!(ServiceKey::parse("|http").is_none());
        assert!(ServiceKey::parse("hello|http|version").is_none());
    }

    #[test]
    fn test_registration_filters_by_labels() {
        let (args, registry, config) = (args(), registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let all = xds.registration(&ServiceKey::new("hello.default.svc.cluster.local", "http"));
        assert_eq!(all["hosts"].as_array().unwrap().len(), 2);

        let v1 = xds.registration(
            &ServiceKey::parse("hello.default.svc.cluster.local|http|version=v1").unwrap(),
        );
        let hosts = v1["hosts"].as_array().unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0]["ip_address"], "10.1.1.1");
        assert_eq!(hosts[0]["port"], 1080);
        assert_eq!(hosts[0]["tags"]["version"], "v1");

        let unknown = xds.registration(&ServiceKey::new("nope.local", "http"));
        assert_eq!(unknown["hosts"], json!([]));
    }

    #[test]
    fn test_clusters_use_mesh_connect_timeout() {
        let (args, registry, config) = (args(), registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let clusters = xds.clusters();
        let clusters = clusters["clusters"].as_array().unwrap();
        // 2 services x 4 ports, plus rds
        assert_eq!(clusters.len(), 9);
        assert!(clusters.iter().all(|c| c["connect_timeout_ms"] == 1000));

        let grpc = clusters
            .iter()
            .find(|c| c["name"] == "out.hello.default.svc.cluster.local|grpc")
            .unwrap();
        assert_eq!(grpc["features"], "http2");
        assert_eq!(grpc["service_name"], "hello.default.svc.cluster.local|grpc");
    }

    #[test]
    fn test_clusters_include_route_subsets() {
        let (args, registry) = (args(), registry());
        let config = snapshot(vec![entry(
            "RouteRule",
            "hello-split",
            json!({"destination": {"name": "hello"}, "route": [
                {"labels": {"version": "v1"}, "weight": 75},
                {"labels": {"version": "v0"}, "weight": 25},
            ]}),
        )]);
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let clusters = xds.clusters();
        let names: Vec<&str> = clusters["clusters"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert!(names.contains(&"out.hello.default.svc.cluster.local|http|version=v1"));
        assert!(names.contains(&"out.hello.default.svc.cluster.local|http|version=v0"));
        assert!(!names.contains(&"out.world.default.svc.cluster.local|http|version=v1"));
    }

    #[test]
    fn test_destination_policy_sets_circuit_breakers() {
        let (args, registry) = (args(), registry());
        let config = snapshot(vec![entry(
            "DestinationPolicy",
            "hello-cb",
            json!({"destination": {"name": "hello"}, "circuitBreaker": {"simpleCb": {
                "maxConnections": 10,
                "httpMaxRequests": 20,
                "sleepWindow": "15s",
            }}}),
        )]);
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let clusters = xds.clusters();
        let cluster = |name: &str| {
            clusters["clusters"]
                .as_array()
                .unwrap()
                .iter()
                .find(|c| c["name"] == name)
                .cloned()
                .unwrap()
        };
        assert_eq!(
            cluster("out.hello.default.svc.cluster.local|http")["circuit_breakers"],
            json!({"default": {"max_connections": 10, "max_requests": 20}})
        );
        assert!(cluster("out.world.default.svc.cluster.local|http")
            .get("circuit_breakers")
            .is_none());
    }

    #[test]
    fn test_listeners() {
        let (args, registry, config) = (args(), registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let listeners = xds.listeners();
        let listeners = listeners["listeners"].as_array().unwrap();
        let names: Vec<&str> = listeners.iter().filter_map(|l| l["name"].as_str()).collect();
        assert_eq!(
            names,
            [
                "http_0.0.0.0_80",
                "http_0.0.0.0_81",
                "http_0.0.0.0_90",
                "tcp_0.0.0.0_100",
                "virtual",
                "http_proxy"
            ]
        );

        let proxy = listeners.iter().find(|l| l["name"] == "http_proxy").unwrap();
        assert_eq!(proxy["address"], "tcp://0.0.0.0:15002");
        let config = &proxy["filters"][0]["config"];
        assert_eq!(config["rds"]["route_config_name"], "http_proxy");
        assert_eq!(config["rds"]["refresh_delay_ms"], 10);
        assert_eq!(config["filters"][0]["name"], "mixer");
        assert_eq!(config["filters"][0]["config"]["mixer_server"], "localhost:9091");

        let virtual_listener = listeners.iter().find(|l| l["name"] == "virtual").unwrap();
        assert_eq!(virtual_listener["address"], "tcp://0.0.0.0:15001");
    }

    #[test]
    fn test_listeners_without_http_proxy_or_mixer() {
        let mut args = args();
        args.mesh_config = MeshConfig::default();
        args.mesh.mixer_address.clear();
        let (registry, config) = (registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let listeners = xds.listeners();
        let listeners = listeners["listeners"].as_array().unwrap();
        assert!(listeners.iter().all(|l| l["name"] != "http_proxy"));
        let http = &listeners[0]["filters"][0]["config"]["filters"];
        assert_eq!(http.as_array().unwrap().len(), 1);
        assert_eq!(http[0]["name"], "router");
    }

    #[test]
    fn test_routes_default_cluster() {
        let (args, registry, config) = (args(), registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let routes = xds.routes("80");
        let hosts = routes["virtual_hosts"].as_array().unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0]["name"], "hello.default.svc.cluster.local:80");
        assert!(hosts[0]["domains"]
            .as_array()
            .unwrap()
            .contains(&json!("hello:80")));
        assert_eq!(
            hosts[0]["routes"][0]["cluster"],
            "out.hello.default.svc.cluster.local|http"
        );

        assert_eq!(xds.routes("100")["virtual_hosts"], json!([]));
        assert_eq!(xds.routes("bogus")["virtual_hosts"], json!([]));
    }

    #[test]
    fn test_routes_http_proxy() {
        let (args, registry, config) = (args(), registry(), snapshot(vec![]));
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let routes = xds.routes(HTTP_PROXY_ROUTE);
        // 2 services x 3 HTTP-routed ports
        assert_eq!(routes["virtual_hosts"].as_array().unwrap().len(), 6);
        assert_eq!(
            routes["virtual_hosts"][0]["domains"],
            json!(["hello.default.svc.cluster.local:80"])
        );
    }

    #[test]
    fn test_routes_weighted_by_route_rule() {
        let (args, registry) = (args(), registry());
        let config = snapshot(vec![
            entry(
                "RouteRule",
                "hello-low",
                json!({"destination": {"name": "hello"}, "route": [{"labels": {"version": "v0"}}]}),
            ),
            entry(
                "RouteRule",
                "hello-split",
                json!({"destination": {"name": "hello"}, "precedence": 2, "route": [
                    {"labels": {"version": "v1"}, "weight": 90},
                    {"labels": {"version": "v0"}, "weight": 10},
                ]}),
            ),
        ]);
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let routes = xds.routes("80");
        let hello = &routes["virtual_hosts"][0]["routes"][0]["weighted_clusters"]["clusters"];
        assert_eq!(
            hello[0]["name"],
            "out.hello.default.svc.cluster.local|http|version=v1"
        );
        assert_eq!(hello[0]["weight"], 90);
        assert_eq!(hello[1]["weight"], 10);

        let world = &routes["virtual_hosts"][1]["routes"][0];
        assert_eq!(world["cluster"], "out.world.default.svc.cluster.local|http");
    }

    #[test]
    fn test_routes_virtual_service_subset() {
        let (args, registry) = (args(), registry());
        let config = snapshot(vec![entry(
            "VirtualService",
            "world",
            json!({"hosts": ["world.default.svc.cluster.local"], "http": [{"route": [
                {"destination": {"host": "world", "subset": "v1"}}
            ]}]}),
        )]);
        let xds = XdsBuilder { args: &args, registry: &registry, config: &config };

        let routes = xds.routes("80");
        let world = &routes["virtual_hosts"][1]["routes"][0]["weighted_clusters"]["clusters"];
        assert_eq!(
            world[0]["name"],
            "out.world.default.svc.cluster.local|http|version=v1"
        );
        assert_eq!(world[0]["weight"], 100);
    }
}

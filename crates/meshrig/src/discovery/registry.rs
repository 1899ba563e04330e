//! Service registries backing the discovery service.

use std::collections::BTreeMap;

use serde::Serialize;

use super::DiscoveryError;
use crate::config::MOCK_REGISTRY;

/// Application protocol of a service port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    Http,
    Http2,
    Grpc,
    Tcp,
    Mongo,
}

impl PortProtocol {
    /// Whether traffic on this port is routed by HTTP route tables.
    pub fn is_http(self) -> bool {
        matches!(self, PortProtocol::Http | PortProtocol::Http2 | PortProtocol::Grpc)
    }

    /// Whether upstream connections must speak HTTP/2.
    pub fn is_http2(self) -> bool {
        matches!(self, PortProtocol::Http2 | PortProtocol::Grpc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub protocol: PortProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    /// Fully qualified hostname, e.g. `hello.default.svc.cluster.local`.
    pub hostname: String,
    pub address: String,
    pub ports: Vec<ServicePort>,
}

impl Service {
    pub fn port(&self, name: &str) -> Option<&ServicePort> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// First label of the hostname.
    pub fn short_name(&self) -> &str {
        self.hostname.split('.').next().unwrap_or(&self.hostname)
    }
}

/// One endpoint of a service port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInstance {
    pub hostname: String,
    pub address: String,
    pub port: u16,
    pub service_port: ServicePort,
    pub labels: BTreeMap<String, String>,
}

impl ServiceInstance {
    /// Whether every label in `selector` is carried by this instance.
    pub fn matches(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(key, value)| self.labels.get(key) == Some(value))
    }
}

/// Source of services and their endpoints.
pub trait ServiceRegistry: Send + Sync {
    fn name(&self) -> &str;

    fn services(&self) -> Vec<Service>;

    fn instances(&self, hostname: &str, port_name: &str) -> Vec<ServiceInstance>;
}

/// Fixed registry exposing the `hello` and `world` services.
///
/// Each service has two endpoints, labelled `version=v0` and `version=v1`,
/// whose ports are the service port plus 1000.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    services: Vec<Service>,
    instances: Vec<ServiceInstance>,
}

const MOCK_VERSIONS: [&str; 2] = ["v0", "v1"];

impl MockRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            services: Vec::new(),
            instances: Vec::new(),
        };
        registry.add("hello.default.svc.cluster.local", "10.1.0.0", "10.1.1");
        registry.add("world.default.svc.cluster.local", "10.2.0.0", "10.2.1");
        registry
    }

    fn add(&mut self, hostname: &str, address: &str, endpoint_prefix: &str) {
        let ports = vec![
            ServicePort {
                name: "http".to_string(),
                port: 80,
                protocol: PortProtocol::Http,
            },
            ServicePort {
                name: "http-status".to_string(),
                port: 81,
                protocol: PortProtocol::Http,
            },
            ServicePort {
                name: "grpc".to_string(),
                port: 90,
                protocol: PortProtocol::Grpc,
            },
            ServicePort {
                name: "mongo".to_string(),
                port: 100,
                protocol: PortProtocol::Mongo,
            },
        ];

        for (index, version) in MOCK_VERSIONS.iter().enumerate() {
            for port in &ports {
                self.instances.push(ServiceInstance {
                    hostname: hostname.to_string(),
                    address: format!("{endpoint_prefix}.{index}"),
                    port: port.port + 1000,
                    service_port: port.clone(),
                    labels: BTreeMap::from([("version".to_string(), version.to_string())]),
                });
            }
        }

        self.services.push(Service {
            hostname: hostname.to_string(),
            address: address.to_string(),
            ports,
        });
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry for MockRegistry {
    fn name(&self) -> &str {
        MOCK_REGISTRY
    }

    fn services(&self) -> Vec<Service> {
        self.services.clone()
    }

    fn instances(&self, hostname: &str, port_name: &str) -> Vec<ServiceInstance> {
        self.instances
            .iter()
            .filter(|i| i.hostname == hostname && i.service_port.name == port_name)
            .cloned()
            .collect()
    }
}

/// All configured registries, queried in order.
pub struct AggregateRegistry {
    registries: Vec<Box<dyn ServiceRegistry>>,
}

impl AggregateRegistry {
    /// Build the registries named in `names`. Unknown names are an error.
    pub fn from_names(names: &[String]) -> Result<Self, DiscoveryError> {
        let registries = names
            .iter()
            .map(|name| match name.as_str() {
                MOCK_REGISTRY => Ok(Box::new(MockRegistry::new()) as Box<dyn ServiceRegistry>),
                other => Err(DiscoveryError::UnknownRegistry(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { registries })
    }

    pub fn names(&self) -> Vec<&str> {
        self.registries.iter().map(|r| r.name()).collect()
    }

    /// Every service, sorted by hostname. The first registry wins on duplicates.
    pub fn services(&self) -> Vec<Service> {
        let mut by_host: BTreeMap<String, Service> = BTreeMap::new();
        for registry in &self.registries {
            for service in registry.services() {
                by_host.entry(service.hostname.clone()).or_insert(service);
            }
        }
        by_host.into_values().collect()
    }

    pub fn service(&self, hostname: &str) -> Option<Service> {
        self.services().into_iter().find(|s| s.hostname == hostname)
    }

    pub fn instances(&self, hostname: &str, port_name: &str) -> Vec<ServiceInstance> {
        self.registries
            .iter()
            .flat_map(|r| r.instances(hostname, port_name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_registry_services() {
        let registry = MockRegistry::new();
        let hosts: Vec<String> = registry.services().into_iter().map(|s| s.hostname).collect();
        assert_eq!(
            hosts,
            [
                "hello.default.svc.cluster.local",
                "world.default.svc.cluster.local"
            ]
        );
    }

    #[test]
    fn test_mock_registry_instances() {
        let registry = MockRegistry::new();
        let instances = registry.instances("hello.default.svc.cluster.local", "http");
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].address, "10.1.1.0");
        assert_eq!(instances[0].port, 1080);
        assert_eq!(instances[0].labels["version"], "v0");
        assert_eq!(instances[1].address, "10.1.1.1");
        assert_eq!(instances[1].labels["version"], "v1");

        assert!(registry.instances("hello.default.svc.cluster.local", "nope").is_empty());
    }

    #[test]
    fn test_instance_selector() {
        let registry = MockRegistry::new();
        let v1 = BTreeMap::from([("version".to_string(), "v1".to_string())]);
        let matching: Vec<_> = registry
            .instances("world.default.svc.cluster.local", "grpc")
            .into_iter()
            .filter(|i| i.matches(&v1))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].address, "10.2.1.1");
        assert_eq!(matching[0].port, 1090);
    }

    #[test]
    fn test_aggregate_unknown_registry() {
        let err = AggregateRegistry::from_names(&["Kubernetes".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, DiscoveryError::UnknownRegistry(name) if name == "Kubernetes"));
    }

    #[test]
    fn test_aggregate_deduplicates_services() {
        let registry =
            AggregateRegistry::from_names(&["Mock".to_string(), "Mock".to_string()]).unwrap();
        assert_eq!(registry.names(), ["Mock", "Mock"]);
        assert_eq!(registry.services().len(), 2);
        let hello = registry.service("hello.default.svc.cluster.local").unwrap();
        assert_eq!(hello.short_name(), "hello");
        assert_eq!(hello.port("grpc").unwrap().protocol, PortProtocol::Grpc);
    }
}

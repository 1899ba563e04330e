//! Built-in Envoy v2 bootstrap document.

use serde_json::{json, Value};

use super::{format_duration, BootstrapError, ProxyBootstrapConfig};

/// Cluster name the dynamic resources are fetched from.
const XDS_CLUSTER: &str = "xds";

pub(super) fn bootstrap(config: &ProxyBootstrapConfig, node_id: &str) -> Result<Value, BootstrapError> {
    let (host, port) = config.discovery_host_port()?;
    let refresh_delay = format_duration(config.discovery_refresh_delay);

    let api_config_source = json!({
        "api_config_source": {
            "api_type": "REST_LEGACY",
            "cluster_names": [XDS_CLUSTER],
            "refresh_delay": refresh_delay,
        }
    });

    Ok(json!({
        "node": {
            "id": node_id,
            "cluster": config.service_cluster,
            "metadata": {
                "proxy_config": serde_json::to_value(config)?,
            },
        },
        "admin": {
            "access_log_path": "/dev/null",
            "address": {
                "socket_address": {
                    "address": "127.0.0.1",
                    "port_value": config.proxy_admin_port,
                }
            },
        },
        "dynamic_resources": {
            "lds_config": api_config_source.clone(),
            "cds_config": api_config_source,
        },
        "static_resources": {
            "clusters": [{
                "name": XDS_CLUSTER,
                "type": "STRICT_DNS",
                "connect_timeout": format_duration(config.connect_timeout),
                "lb_policy": "ROUND_ROBIN",
                "hosts": [{
                    "socket_address": {
                        "address": host,
                        "port_value": port,
                    }
                }],
            }],
        },
    }))
}

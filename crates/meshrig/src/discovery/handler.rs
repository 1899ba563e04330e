//! Discovery API routing and response cache.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::debug;

use super::registry::AggregateRegistry;
use super::store::ConfigStore;
use super::xds::{ServiceKey, XdsBuilder};
use crate::config::HarnessArgs;
use crate::response::{build_response_with_headers, error_response, json_response, not_found};
use crate::server::{RequestHandler, ResponseBody};

/// Response header telling whether a discovery response came from the cache.
pub const CACHE_HEADER: &str = "x-discovery-cache";

/// Most responses kept per store version.
const MAX_CACHED_RESPONSES: usize = 1024;

/// Parsed discovery API route. The service cluster and node segments do not
/// affect the response and are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Route {
    /// GET /v1/registration
    Registrations,
    /// GET /v1/registration/:service-key
    Registration(String),
    /// GET /v1/clusters/:cluster/:node
    Clusters,
    /// GET /v1/listeners/:cluster/:node
    Listeners,
    /// GET /v1/routes/:route/:cluster/:node
    Routes(String),
    /// GET /debug/configz
    Configz,
    /// GET /debug/registryz
    Registryz,
    /// GET /ready
    Ready,
}

impl Route {
    fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["v1", "registration"] => Some(Route::Registrations),
            ["v1", "registration", key] => urlencoding::decode(key)
                .ok()
                .map(|key| Route::Registration(key.into_owned())),
            ["v1", "clusters", _cluster, _node] => Some(Route::Clusters),
            ["v1", "listeners", _cluster, _node] => Some(Route::Listeners),
            ["v1", "routes", route, _cluster, _node] => Some(Route::Routes(route.to_string())),
            ["debug", "configz"] => Some(Route::Configz),
            ["debug", "registryz"] => Some(Route::Registryz),
            ["ready"] => Some(Route::Ready),
            _ => None,
        }
    }

    fn cacheable(&self) -> bool {
        !matches!(self, Route::Configz | Route::Registryz | Route::Ready)
    }

    fn is_debug(&self) -> bool {
        matches!(self, Route::Configz | Route::Registryz)
    }
}

/// Cached response bodies, valid for one store version.
#[derive(Debug, Default)]
struct ResponseCache {
    version: u64,
    bodies: HashMap<Route, Bytes>,
}

impl ResponseCache {
    /// Drop every body built against an older store version.
    fn sync(&mut self, version: u64) {
        if self.version != version {
            self.bodies.clear();
            self.version = version;
        }
    }

    fn get(&self, route: &Route) -> Option<Bytes> {
        self.bodies.get(route).cloned()
    }

    /// Store `body` unless the cache is full.
    fn insert(&mut self, route: &Route, body: Bytes) {
        if self.bodies.len() < MAX_CACHED_RESPONSES || self.bodies.contains_key(route) {
            self.bodies.insert(route.clone(), body);
        }
    }
}

pub(super) struct DiscoveryHandler {
    args: HarnessArgs,
    store: Arc<ConfigStore>,
    registry: Arc<AggregateRegistry>,
    cache: Mutex<ResponseCache>,
}

impl DiscoveryHandler {
    pub(super) fn new(
        args: HarnessArgs,
        store: Arc<ConfigStore>,
        registry: Arc<AggregateRegistry>,
    ) -> Self {
        Self {
            args,
            store,
            registry,
            cache: Mutex::new(ResponseCache::default()),
        }
    }

    fn build(&self, route: &Route) -> Value {
        let config = self.store.snapshot();
        let xds = XdsBuilder {
            args: &self.args,
            registry: &self.registry,
            config: &config,
        };
        match route {
            Route::Registrations => xds.registrations(),
            Route::Registration(key) => match ServiceKey::parse(key) {
                Some(key) => xds.registration(&key),
                None => json!({ "hosts": [] }),
            },
            Route::Clusters => xds.clusters(),
            Route::Listeners => xds.listeners(),
            Route::Routes(name) => xds.routes(name),
            Route::Configz => json!({
                "version": self.store.version(),
                "dir": self.store.dir(),
                "entries": config.entries,
            }),
            Route::Registryz => json!({
                "registries": self.registry.names(),
                "services": self.registry.services(),
            }),
            Route::Ready => json!({ "ready": true }),
        }
    }

    fn serve(&self, route: &Route) -> Response<ResponseBody> {
        if !(self.args.discovery.enable_caching && route.cacheable()) {
            return json_response(StatusCode::OK, &self.build(route));
        }

        let version = self.store.version();
        {
            let mut cache = self.cache.lock();
            cache.sync(version);
            if let Some(body) = cache.get(route) {
                return cached_response(body, "hit");
            }
        }

        let body = match serde_json::to_vec_pretty(&self.build(route)) {
            Ok(body) => Bytes::from(body),
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        };

        let mut cache = self.cache.lock();
        // A reload may have landed while building; only cache for the version
        // the body was built against.
        if cache.version == version {
            cache.insert(route, body.clone());
        }
        cached_response(body, "miss")
    }
}

fn cached_response(body: Bytes, status: &str) -> Response<ResponseBody> {
    build_response_with_headers(
        StatusCode::OK,
        [("content-type", "application/json"), (CACHE_HEADER, status)],
        body,
    )
}

#[async_trait]
impl RequestHandler for DiscoveryHandler {
    async fn handle(&self, req: Request<Incoming>, _peer: SocketAddr) -> Response<ResponseBody> {
        let path = req.uri().path();
        debug!(method = %req.method(), %path, "discovery request");

        let Some(route) = Route::parse(path) else {
            return not_found();
        };
        if route.is_debug() && !self.args.discovery.enable_profiling {
            return not_found();
        }
        if req.method() != Method::GET {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        }
        self.serve(&route)
    }
}

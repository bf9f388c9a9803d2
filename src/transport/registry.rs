//! Transport Registry
//!
//! Process-wide map from transport kind names to constructors. Built-in
//! transports are registered the first time the registry is touched; client
//! bootstrap code can add more with [`register`].

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::transport::http::HttpTransport;
use crate::transport::Transport;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Constructor stored in the registry
pub type TransportFactory = fn(TransportConfig) -> Result<Box<dyn Transport>>;

static REGISTRY: OnceLock<RwLock<HashMap<String, TransportFactory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, TransportFactory>> {
    REGISTRY.get_or_init(|| {
        let mut builtin: HashMap<String, TransportFactory> = HashMap::new();
        builtin.insert(HttpTransport::KIND.to_string(), HttpTransport::factory);
        RwLock::new(builtin)
    })
}

/// Register `factory` under `kind`, replacing any previous entry
pub fn register(kind: impl Into<String>, factory: TransportFactory) {
    let kind = kind.into();
    debug!(kind = %kind, "registering transport");
    registry().write().insert(kind, factory);
}

/// Look up the constructor for `kind`
pub fn lookup(kind: &str) -> Option<TransportFactory> {
    registry().read().get(kind).copied()
}

/// Construct a transport of the given kind
pub fn create(kind: &str, config: TransportConfig) -> Result<Box<dyn Transport>> {
    let factory = lookup(kind).ok_or_else(|| TransportError::UnknownTransport(kind.to_string()))?;
    factory(config)
}

/// Registered kind names, sorted
pub fn kinds() -> Vec<String> {
    let mut kinds: Vec<String> = registry().read().keys().cloned().collect();
    kinds.sort();
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::request::Request;
    use serde_json::{json, Value};

    struct StaticTransport;

    impl Transport for StaticTransport {
        fn kind(&self) -> &'static str {
            "static"
        }

        fn send(&self, request: Request) -> Result<Option<Value>> {
            Ok(Some(json!({"url": request.url()})))
        }
    }

    fn static_factory(_config: TransportConfig) -> Result<Box<dyn Transport>> {
        Ok(Box::new(StaticTransport))
    }

    fn failing_factory(_config: TransportConfig) -> Result<Box<dyn Transport>> {
        Err(TransportError::DependencyMissing("test".to_string()))
    }

    #[test]
    fn test_builtin_registered() {
        assert!(lookup(HttpTransport::KIND).is_some());
        assert!(kinds().contains(&HttpTransport::KIND.to_string()));

        let transport = create(HttpTransport::KIND, TransportConfig::default()).unwrap();
        assert_eq!(transport.kind(), HttpTransport::KIND);
    }

    #[test]
    fn test_register_and_create() {
        register("static-registry-test", static_factory);

        let transport = create("static-registry-test", TransportConfig::default()).unwrap();
        let value = transport.send(Request::get("http://localhost/v1/zones")).unwrap();
        assert_eq!(value, Some(json!({"url": "http://localhost/v1/zones"})));
    }

    #[test]
    fn test_reregistration_overwrites() {
        register("overwrite-registry-test", static_factory);
        register("overwrite-registry-test", failing_factory);

        let result = create("overwrite-registry-test", TransportConfig::default());
        assert!(matches!(result, Err(TransportError::DependencyMissing(_))));
    }

    #[test]
    fn test_unknown_kind() {
        let result = create("twisted", TransportConfig::default());
        assert!(matches!(result, Err(TransportError::UnknownTransport(k)) if k == "twisted"));
    }
}

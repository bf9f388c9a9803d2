//! ns1-transport - HTTP transport for the NS1 REST API
//!
//! Issues a single blocking request per call, reports the `X-RateLimit-*`
//! telemetry of every response to a notification function, maps status codes
//! to a structured error taxonomy and decodes JSON bodies.
//!
//! ```no_run
//! use ns1_transport::{HttpTransport, Request, Transport, TransportConfig, TransportError};
//!
//! let config = TransportConfig::new().with_rate_limit_notify(|rl| {
//!     println!("{} requests left", rl.remaining);
//! });
//! let transport = HttpTransport::new(config)?;
//!
//! let request = Request::get("https://api.nsone.net/v1/zones").header("X-NSONE-Key", "...");
//! match transport.send(request) {
//!     Ok(zones) => println!("{:?}", zones),
//!     Err(TransportError::RateLimit { period, .. }) => println!("back off for {}s", period),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), TransportError>(())
//! ```

pub mod config;
pub mod error;
pub mod transport;

pub use config::{ConfigLoader, Timeout, TransportConfig, TransportSettings};
pub use error::{Result, TransportError};
pub use transport::{
    registry, FileAttachment, HttpTransport, Method, RateLimitNotifier, RateLimitRecorder,
    RateLimitSnapshot, RateLimitStrategy, RawResponse, Request, Transport, TransportBase,
};

/// Build the transport named by `settings.transport` through the registry
pub fn transport_from_settings(settings: &TransportSettings) -> Result<Box<dyn Transport>> {
    let config = settings.to_config()?;
    registry::create(&settings.transport, config)
}

/// Load settings from the default config locations and build the transport they name
pub fn transport_from_default_config() -> Result<Box<dyn Transport>> {
    let loader = ConfigLoader::new()?;
    transport_from_settings(loader.settings())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_settings() {
        let settings = TransportSettings::default();
        let transport = transport_from_settings(&settings).unwrap();
        assert_eq!(transport.kind(), HttpTransport::KIND);
    }

    #[test]
    fn test_transport_from_settings_unknown_kind() {
        let settings = TransportSettings {
            transport: "urllib".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            transport_from_settings(&settings),
            Err(TransportError::UnknownTransport(_))
        ));
    }
}

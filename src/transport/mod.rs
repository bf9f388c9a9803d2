//! Transport Module
//!
//! The transport contract, its shared base, the kind registry and the
//! blocking HTTP implementation.

pub mod base;
pub mod http;
pub mod rate_limiter;
pub mod registry;
pub mod request;
pub mod response;

pub use base::TransportBase;
pub use http::HttpTransport;
pub use rate_limiter::{
    RateLimitNotifier, RateLimitRecorder, RateLimitSnapshot, RateLimitStrategy,
};
pub use registry::TransportFactory;
pub use request::{Callback, Errback, FileAttachment, Method, Request};
pub use response::RawResponse;

use crate::error::Result;
use serde_json::Value;

/// A mechanism that can carry one request to the API and classify its outcome
///
/// `send` yields exactly one outcome per call: the decoded body (or the
/// callback's result), the errback's result, or a structured error.
pub trait Transport: Send + Sync {
    /// Registry key of this transport
    fn kind(&self) -> &'static str;

    /// Issue `request` and deliver its outcome
    fn send(&self, request: Request) -> Result<Option<Value>>;
}

//! Transport Error Types
//!
//! Status-code driven error taxonomy surfaced to resource classes.

use crate::transport::rate_limiter::RateLimitSnapshot;
use crate::transport::response::RawResponse;
use thiserror::Error;

/// Main error type for transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed
    #[error("HTTP client unavailable: {0}")]
    DependencyMissing(String),

    /// HTTP 429
    #[error("{message}")]
    RateLimit {
        message: String,
        response: Box<RawResponse>,
        body: String,
        by: String,
        limit: u64,
        period: u64,
        remaining: u64,
    },

    /// HTTP 401
    #[error("{message}")]
    Auth {
        message: String,
        response: Box<RawResponse>,
        body: String,
    },

    /// Any other non-2xx status, or an undecodable 2xx body
    #[error("{message}")]
    Resource {
        message: String,
        response: Box<RawResponse>,
        body: String,
    },

    /// Connection, DNS, TLS or timeout failure, passed through untranslated
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Verb outside GET/POST/PUT/DELETE
    #[error("Unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    /// Settings file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// No transport registered under the requested kind
    #[error("No transport registered for kind '{0}'")]
    UnknownTransport(String),
}

impl TransportError {
    pub(crate) fn rate_limit(response: RawResponse, snapshot: RateLimitSnapshot) -> Self {
        let body = response.text().to_string();
        TransportError::RateLimit {
            message: "rate limit exceeded".to_string(),
            response: Box::new(response),
            body,
            by: snapshot.by,
            limit: snapshot.limit,
            period: snapshot.period,
            remaining: snapshot.remaining,
        }
    }

    pub(crate) fn auth(response: RawResponse) -> Self {
        let body = response.text().to_string();
        TransportError::Auth {
            message: "unauthorized".to_string(),
            response: Box::new(response),
            body,
        }
    }

    pub(crate) fn resource(message: &str, response: RawResponse) -> Self {
        let body = response.text().to_string();
        TransportError::Resource {
            message: message.to_string(),
            response: Box::new(response),
            body,
        }
    }

    /// The raw response behind a status-classified error
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            TransportError::RateLimit { response, .. }
            | TransportError::Auth { response, .. }
            | TransportError::Resource { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// The response body text behind a status-classified error
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::RateLimit { body, .. }
            | TransportError::Auth { body, .. }
            | TransportError::Resource { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }

    /// Rate limit fields carried by a 429 error
    pub fn rate_limit_snapshot(&self) -> Option<RateLimitSnapshot> {
        match self {
            TransportError::RateLimit {
                by,
                limit,
                period,
                remaining,
                ..
            } => Some(RateLimitSnapshot {
                by: by.clone(),
                limit: *limit,
                period: *period,
                remaining: *remaining,
            }),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Config(format!("JSON parsing error: {}", err))
    }
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

//! HTTP Transport
//!
//! Blocking transport that issues one request per `send`, reports rate limit
//! telemetry, classifies the status code and decodes the JSON body.

use crate::config::{Timeout, TransportConfig};
use crate::error::{Result, TransportError};
use crate::transport::base::TransportBase;
use crate::transport::rate_limiter::RateLimitSnapshot;
use crate::transport::request::{Callback, Errback, Request};
use crate::transport::response::RawResponse;
use crate::transport::Transport;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking HTTP transport backed by reqwest
#[derive(Debug)]
pub struct HttpTransport {
    base: TransportBase,
    client: Client,
}

impl HttpTransport {
    /// Registry key
    pub const KIND: &'static str = "requests";

    /// Create a transport, building the underlying HTTP client
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify);

        builder = match config.timeout {
            Timeout::NoTimeout => builder.timeout(None::<Duration>),
            Timeout::Single(total) => builder.timeout(total),
            // The blocking client has no read timeout, so the read budget extends the total
            Timeout::ConnectRead(connect, read) => builder
                .connect_timeout(connect)
                .timeout(connect.checked_add(read).unwrap_or(Duration::MAX)),
        };

        let client = builder.build().map_err(|e| {
            TransportError::DependencyMissing(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            base: TransportBase::new(config, Self::KIND),
            client,
        })
    }

    /// Registry constructor
    pub fn factory(config: TransportConfig) -> Result<Box<dyn Transport>> {
        Ok(Box::new(Self::new(config)?))
    }

    pub fn base(&self) -> &TransportBase {
        &self.base
    }

    /// Issue the request and read the response to completion
    fn execute(&self, request: &Request) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if request.files.is_empty() {
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }
        } else {
            if request.body.is_some() {
                warn!(url = %request.url, "raw body ignored for multipart upload");
            }
            let mut form = Form::new();
            for file in &request.files {
                form = form.part(file.field().to_string(), file.to_part()?);
            }
            builder = builder.multipart(form);
        }

        let response = builder.send()?;
        Ok(RawResponse::read(response)?)
    }
}

impl Transport for HttpTransport {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn send(&self, request: Request) -> Result<Option<Value>> {
        self.base.log_headers(&request.headers);

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.execute(&request)?;

        let snapshot = RateLimitSnapshot::from_headers(response.headers());
        self.base.notify_rate_limit(&snapshot);

        deliver(response, snapshot, request.callback, request.errback)
    }
}

/// Classify a response and route it to exactly one outcome
pub(crate) fn deliver(
    response: RawResponse,
    snapshot: RateLimitSnapshot,
    callback: Option<Callback>,
    errback: Option<Errback>,
) -> Result<Option<Value>> {
    if !response.is_success() {
        debug!(status = %response.status(), url = response.url(), "request failed");
        if let Some(errback) = errback {
            return Ok(errback(response));
        }

        return Err(match response.status() {
            StatusCode::TOO_MANY_REQUESTS => TransportError::rate_limit(response, snapshot),
            StatusCode::UNAUTHORIZED => TransportError::auth(response),
            _ => TransportError::resource("server error", response),
        });
    }

    let decoded = if response.text().is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(response.text()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, url = response.url(), "invalid json in response");
                if let Some(errback) = errback {
                    return Ok(errback(response));
                }
                return Err(TransportError::resource("invalid json in response", response));
            }
        }
    };

    match callback {
        Some(callback) => Ok(callback(decoded)),
        None => Ok(decoded),
    }
}

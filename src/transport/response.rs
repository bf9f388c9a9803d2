//! Raw Response
//!
//! Owned copy of an HTTP response, handed to errbacks and carried by errors.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// A fully-read HTTP response
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    url: String,
    headers: HeaderMap,
    text: String,
}

impl RawResponse {
    /// Create a response from its parts
    pub fn new(status: StatusCode, url: String, headers: HeaderMap, text: String) -> Self {
        Self {
            status,
            url,
            headers,
            text,
        }
    }

    /// Read a blocking reqwest response to completion
    pub fn read(response: reqwest::blocking::Response) -> reqwest::Result<Self> {
        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let text = response.text()?;

        Ok(Self::new(status, url, headers, text))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Final URL after redirects
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Response body as text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the status is in 200..300
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-RateLimit-Remaining").unwrap(),
            HeaderValue::from_static("42"),
        );

        let response = RawResponse::new(
            StatusCode::OK,
            "http://localhost/v1/zones".to_string(),
            headers,
            String::new(),
        );

        assert_eq!(response.header("x-ratelimit-remaining"), Some("42"));
        assert_eq!(response.header("X-RATELIMIT-REMAINING"), Some("42"));
        assert!(response.header("x-ratelimit-limit").is_none());
        assert!(response.is_success());
    }
}

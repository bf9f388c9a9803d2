//! Request Descriptor
//!
//! Everything `send` needs for one call: verb, URL, headers, payload and the
//! optional success/error continuations.

use crate::error::{Result, TransportError};
use crate::transport::response::RawResponse;
use bytes::Bytes;
use reqwest::blocking::multipart::Part;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The HTTP verbs the REST API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(TransportError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Success continuation: receives the decoded body, its return value is the result of `send`
pub type Callback = Box<dyn FnOnce(Option<Value>) -> Option<Value> + Send>;

/// Error continuation: receives the raw response instead of a structured error
pub type Errback = Box<dyn FnOnce(RawResponse) -> Option<Value> + Send>;

/// A file sent as one part of a multipart upload
#[derive(Debug, Clone)]
pub struct FileAttachment {
    field: String,
    file_name: Option<String>,
    mime: Option<String>,
    content: Bytes,
}

impl FileAttachment {
    pub fn new(field: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            field: field.into(),
            file_name: None,
            mime: None,
            content: content.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Form field name
    pub fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn to_part(&self) -> reqwest::Result<Part> {
        let mut part = Part::bytes(self.content.to_vec());
        if let Some(name) = &self.file_name {
            part = part.file_name(name.clone());
        }
        if let Some(mime) = &self.mime {
            part = part.mime_str(mime)?;
        }
        Ok(part)
    }
}

/// A single request to issue through a transport
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<Bytes>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) files: Vec<FileAttachment>,
    pub(crate) callback: Option<Callback>,
    pub(crate) errback: Option<Errback>,
}

impl Request {
    /// Create a request for a fully composed URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            query: Vec::new(),
            files: Vec::new(),
            callback: None,
            errback: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Add a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several request headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the raw request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the request body
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(value)?;
        Ok(self.body(encoded))
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a file, turning the request into a multipart upload
    pub fn file(mut self, file: FileAttachment) -> Self {
        self.files.push(file);
        self
    }

    /// Continuation for a successful, decoded response
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Option<Value>) -> Option<Value> + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Continuation that replaces structured errors with the raw response
    pub fn errback<F>(mut self, errback: F) -> Self
    where
        F: FnOnce(RawResponse) -> Option<Value> + Send + 'static,
    {
        self.errback = Some(Box::new(errback));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header_pairs(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.len())
            .field("body", &self.body.as_ref().map(Bytes::len))
            .field("query", &self.query)
            .field("files", &self.files.len())
            .field("callback", &self.callback.is_some())
            .field("errback", &self.errback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parse() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(TransportError::UnsupportedMethod(m)) if m == "PATCH"
        ));
    }

    #[test]
    fn test_method_to_reqwest() {
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_request_builder() {
        let request = Request::post("https://api.nsone.net/v1/zones/example.com")
            .header("X-NSONE-Key", "secret")
            .headers([("Accept", "application/json")])
            .query("records", "false")
            .json(&json!({"zone": "example.com"}))
            .unwrap()
            .errback(|_| None);

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header_pairs().len(), 2);
        assert_eq!(request.query, vec![("records".to_string(), "false".to_string())]);
        assert_eq!(
            request.body.as_deref(),
            Some(br#"{"zone":"example.com"}"#.as_slice())
        );
        assert!(request.errback.is_some());
        assert!(request.callback.is_none());
    }

    #[test]
    fn test_file_attachment_part() {
        let file = FileAttachment::new("zonefile", "example.com. 3600 IN A 1.2.3.4")
            .with_file_name("example.com.zone")
            .with_mime("text/plain");

        assert_eq!(file.field(), "zonefile");
        assert!(file.to_part().is_ok());

        let bad = FileAttachment::new("zonefile", "x").with_mime("not a mime");
        assert!(bad.to_part().is_err());
    }
}

//! Request and response types seen by the worker, and the network seam.
//!
//! Requests are always absolute: relative paths from the asset list or the
//! page are resolved against the site origin with [`resolve`] first.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use self::url::{UrlError, resolve};
use crate::Error;

/// How the page issued a request.
///
/// Only `Navigate` matters to the worker: it marks a full-page load, which is
/// the one kind of request allowed to fall back to the offline page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// An outgoing request from a controlled page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: ::url::Url,
    pub mode: RequestMode,
}

impl Request {
    /// A plain `GET` subresource request.
    pub fn get(url: ::url::Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::NoCors }
    }

    /// A full-page navigation to `url`.
    pub fn navigate(url: ::url::Url) -> Self {
        Self { method: "GET".into(), url, mode: RequestMode::Navigate }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// URL as matched by the cache: fragments never take part in matching.
    pub fn cache_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// A response, either fresh from the network or replayed from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Vec::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Status in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The network layer behind the worker.
///
/// Implementations return `Err(Error::Network)` only when no response was
/// received; any HTTP status, including errors, comes back as `Ok`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ::url::Url {
        ::url::Url::parse(s).unwrap()
    }

    #[test]
    fn test_request_constructors() {
        let get = Request::get(url("https://example.com/static/manifest.json"));
        assert_eq!(get.method, "GET");
        assert!(!get.is_navigation());

        let nav = Request::navigate(url("https://example.com/index"));
        assert!(nav.is_navigation());
        assert_eq!(nav.mode, RequestMode::Navigate);
    }

    #[test]
    fn test_with_method_uppercases() {
        let req = Request::get(url("https://example.com/")).with_method("post");
        assert_eq!(req.method, "POST");
    }

    #[test]
    fn test_cache_url_drops_fragment() {
        let req = Request::get(url("https://example.com/index?a=1#top"));
        assert_eq!(req.cache_url(), "https://example.com/index?a=1");
    }

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new("u", 200, "").ok());
        assert!(Response::new("u", 204, "").ok());
        assert!(!Response::new("u", 304, "").ok());
        assert!(!Response::new("u", 404, "").ok());
    }

    #[test]
    fn test_response_header_lookup() {
        let response = Response::new("u", 200, "{}").with_header("Content-Type", "application/json");
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_request_mode_serde() {
        let json = serde_json::to_string(&RequestMode::SameOrigin).unwrap();
        assert_eq!(json, "\"same-origin\"");
        let mode: RequestMode = serde_json::from_str("\"navigate\"").unwrap();
        assert_eq!(mode, RequestMode::Navigate);
    }
}

//! HTTP transport types and the host fetch capability.
//!
//! # Design
//! Requests and responses cross the host boundary as plain data. The client
//! builds an `HttpRequest`, hands it to whatever `Fetch` implementation the
//! host supplied, and normalizes the `HttpResponse` it gets back. The core
//! never opens a socket itself; with the `native` feature disabled it has no
//! I/O dependency at all.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved into a
//! host implementation without lifetime concerns.

use std::fmt;
use std::future::Future;

use crate::error::FetchError;

pub const GET: &str = "GET";
pub const POST: &str = "POST";
pub const PUT: &str = "PUT";
pub const PATCH: &str = "PATCH";
pub const DELETE: &str = "DELETE";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => GET,
            HttpMethod::Post => POST,
            HttpMethod::Put => PUT,
            HttpMethod::Patch => PATCH,
            HttpMethod::Delete => DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_request`. `url` is already fully composed and
/// `headers` already carry the merged defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an `HttpRequest`. The body is
/// the full response text; no streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL of the response (after redirects, if the host follows them).
    pub url: String,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// The host fetch capability.
///
/// Implementations perform exactly one network round-trip per call and report
/// any non-2xx outcome as `Ok`: status interpretation belongs to the client.
/// Transport failures should be returned as `FetchError::Transport` carrying
/// the host's own error.
pub trait Fetch {
    fn fetch(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// Platform-native fetch capability backed by `reqwest`.
#[cfg(feature = "native")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

#[cfg(feature = "native")]
impl ReqwestFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies, TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "native")]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let res = builder.send().await.map_err(FetchError::transport)?;

        let url = res.url().to_string();
        let status = res.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let headers = res
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Fully buffered; no streaming.
        let body = res.text().await.map_err(FetchError::transport)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            url,
            status_text,
            headers,
            body,
        })
    }
}

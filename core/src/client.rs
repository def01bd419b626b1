//! Request dispatcher and verb wrappers.
//!
//! # Design
//! `Client` holds nothing but the host fetch capability, and that capability
//! is optional: a client built with `Client::without_fetch` rejects every
//! call with `NotSupported` before any request is built. Each call is split
//! into `build_request` (pure: URL composition, header merge, body
//! serialization) and a single `Fetch::fetch` round-trip whose result is
//! normalized. There is no retry, no caching and no shared mutable state;
//! every call is independent.

use serde::Serialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::http::{Fetch, HttpMethod, HttpRequest};
use crate::response::NormalizedResponse;
use crate::url::{compose, ComposeOptions, DecodedUrl, UrlOptions};

#[cfg(feature = "native")]
use crate::http::ReqwestFetch;

const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// Target of a request: a bare URL string, or a URL with its own options.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestUrl {
    Plain(String),
    WithOptions(UrlOptions),
}

impl RequestUrl {
    /// Compose the effective URL. A plain string is composed with default
    /// options (trailing slash on, no explicit query or hash).
    pub fn resolve(&self) -> Result<DecodedUrl, FetchError> {
        match self {
            RequestUrl::Plain(url) => compose(url, &ComposeOptions::default()),
            RequestUrl::WithOptions(options) => options.compose(),
        }
    }
}

impl From<&str> for RequestUrl {
    fn from(url: &str) -> Self {
        RequestUrl::Plain(url.to_string())
    }
}

impl From<String> for RequestUrl {
    fn from(url: String) -> Self {
        RequestUrl::Plain(url)
    }
}

impl From<UrlOptions> for RequestUrl {
    fn from(options: UrlOptions) -> Self {
        RequestUrl::WithOptions(options)
    }
}

/// Optional per-call arguments for the verb wrappers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestArgs {
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use any serializable value as the JSON body.
    pub fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self, FetchError> {
        Ok(Self {
            body: Some(serde_json::to_value(body)?),
            headers: Vec::new(),
        })
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// One request, constructed per call and consumed by `Client::dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: RequestUrl,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<RequestUrl>, args: Option<RequestArgs>) -> Self {
        let args = args.unwrap_or_default();
        Self {
            url: url.into(),
            method,
            body: args.body,
            headers: args.headers,
        }
    }
}

/// Turn a descriptor into the plain `HttpRequest` handed to the host.
///
/// Headers start from `Content-Type: application/json`; caller headers
/// replace a default with the same name (compared case-insensitively) and
/// are appended otherwise. A missing body stays missing.
pub fn build_request(descriptor: &RequestDescriptor) -> Result<HttpRequest, FetchError> {
    let url = descriptor.url.resolve()?.full_url;

    let (default_key, default_value) = DEFAULT_CONTENT_TYPE;
    let mut headers = vec![(default_key.to_string(), default_value.to_string())];
    for (key, value) in &descriptor.headers {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(existing) => *existing = (key.clone(), value.clone()),
            None => headers.push((key.clone(), value.clone())),
        }
    }

    let body = descriptor
        .body
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(HttpRequest {
        method: descriptor.method,
        url,
        headers,
        body,
    })
}

/// Dispatches requests through a host fetch capability.
#[derive(Debug, Clone)]
pub struct Client<F> {
    fetch: Option<F>,
}

impl<F: Fetch> Client<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch: Some(fetch) }
    }

    /// A client whose host has no fetch capability. Every call fails with
    /// `NotSupported`.
    pub fn without_fetch() -> Self {
        Self { fetch: None }
    }

    pub fn is_supported(&self) -> bool {
        self.fetch.is_some()
    }

    /// Perform one request.
    ///
    /// Resolves with the normalized response on a 2xx status. Any other
    /// completed status yields `FetchError::Rejected` wrapping the same
    /// normalized response. Host failures are passed through unchanged.
    pub async fn dispatch(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<NormalizedResponse, FetchError> {
        let Some(fetch) = &self.fetch else {
            return Err(FetchError::not_supported());
        };

        let request = build_request(&descriptor)?;
        let method = request.method;
        log::debug!("dispatching {method} {}", request.url);

        let response = NormalizedResponse::from_http(fetch.fetch(request).await?);
        log::debug!("{method} {} completed with {}", response.url, response.status);

        if response.ok {
            Ok(response)
        } else {
            Err(FetchError::Rejected(Box::new(response)))
        }
    }

    pub async fn get(
        &self,
        url: impl Into<RequestUrl>,
        args: Option<RequestArgs>,
    ) -> Result<NormalizedResponse, FetchError> {
        self.dispatch(RequestDescriptor::new(HttpMethod::Get, url, args))
            .await
    }

    pub async fn post(
        &self,
        url: impl Into<RequestUrl>,
        args: Option<RequestArgs>,
    ) -> Result<NormalizedResponse, FetchError> {
        self.dispatch(RequestDescriptor::new(HttpMethod::Post, url, args))
            .await
    }

    pub async fn put(
        &self,
        url: impl Into<RequestUrl>,
        args: Option<RequestArgs>,
    ) -> Result<NormalizedResponse, FetchError> {
        self.dispatch(RequestDescriptor::new(HttpMethod::Put, url, args))
            .await
    }

    pub async fn patch(
        &self,
        url: impl Into<RequestUrl>,
        args: Option<RequestArgs>,
    ) -> Result<NormalizedResponse, FetchError> {
        self.dispatch(RequestDescriptor::new(HttpMethod::Patch, url, args))
            .await
    }

    pub async fn delete(
        &self,
        url: impl Into<RequestUrl>,
        args: Option<RequestArgs>,
    ) -> Result<NormalizedResponse, FetchError> {
        self.dispatch(RequestDescriptor::new(HttpMethod::Delete, url, args))
            .await
    }
}

#[cfg(feature = "native")]
impl Client<ReqwestFetch> {
    /// A client backed by the platform-native `reqwest` capability.
    pub fn native() -> Self {
        Self::new(ReqwestFetch::new())
    }
}

// A fresh native client per call: a pooled reqwest client is bound to the
// runtime it first ran on.

#[cfg(feature = "native")]
pub async fn get(
    url: impl Into<RequestUrl>,
    args: Option<RequestArgs>,
) -> Result<NormalizedResponse, FetchError> {
    Client::native().get(url, args).await
}

#[cfg(feature = "native")]
pub async fn post(
    url: impl Into<RequestUrl>,
    args: Option<RequestArgs>,
) -> Result<NormalizedResponse, FetchError> {
    Client::native().post(url, args).await
}

#[cfg(feature = "native")]
pub async fn put(
    url: impl Into<RequestUrl>,
    args: Option<RequestArgs>,
) -> Result<NormalizedResponse, FetchError> {
    Client::native().put(url, args).await
}

#[cfg(feature = "native")]
pub async fn patch(
    url: impl Into<RequestUrl>,
    args: Option<RequestArgs>,
) -> Result<NormalizedResponse, FetchError> {
    Client::native().patch(url, args).await
}

#[cfg(feature = "native")]
pub async fn delete(
    url: impl Into<RequestUrl>,
    args: Option<RequestArgs>,
) -> Result<NormalizedResponse, FetchError> {
    Client::native().delete(url, args).await
}

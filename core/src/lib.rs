//! Minimal HTTP request helper.
//!
//! # Overview
//! Composes request URLs (query string, hash, trailing-slash policy), sends
//! one request per call through a host-supplied fetch capability, and
//! normalizes whatever comes back into a single `NormalizedResponse` shape.
//!
//! # Design
//! - `url::compose` is pure and does all of the URL work.
//! - `Client` holds only an optional `Fetch` capability. A missing capability
//!   is reported as `NotSupported` before anything is built or sent.
//! - The host round-trip uses plain-data `HttpRequest` / `HttpResponse`
//!   values, so any HTTP stack can sit behind `Fetch`. The `native` feature
//!   (on by default) provides one built on `reqwest`.
//! - No retries, no timeouts, no caching: each call is exactly one request.

pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod url;

pub use client::{build_request, Client, RequestArgs, RequestDescriptor, RequestUrl};
pub use error::FetchError;
pub use http::{Fetch, HttpMethod, HttpRequest, HttpResponse, DELETE, GET, PATCH, POST, PUT};
pub use response::{NormalizedResponse, ResponseData};
pub use url::{compose, encode_query, ComposeOptions, DecodedUrl, UrlOptions};

#[cfg(feature = "native")]
pub use client::{delete, get, patch, post, put};
#[cfg(feature = "native")]
pub use http::ReqwestFetch;

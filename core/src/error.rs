//! Error type for URL composition and request dispatch.
//!
//! # Design
//! Every failure a caller can observe is a `FetchError` variant, and each
//! variant carries a stable machine-readable code (`FetchError::code`) next to
//! its human message. A completed call whose status is outside 2xx is not a
//! transport failure: it lands in `Rejected` carrying the same
//! `NormalizedResponse` a successful call would have produced, so callers
//! can inspect `status` and `data` directly.

use crate::response::NormalizedResponse;

/// Boxed error produced by a host fetch implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the composer and the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The host fetch capability is missing. Raised before any request is built.
    #[error("{0}")]
    NotSupported(String),

    /// A query option was not a key-value mapping.
    #[error("{0}")]
    InvalidType(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The host failed to perform the network call. The source is the raw
    /// error reported by the host.
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// The call completed with a non-2xx status.
    #[error("HTTP {} {}", .0.status, .0.status_text)]
    Rejected(Box<NormalizedResponse>),
}

impl FetchError {
    pub fn not_supported() -> Self {
        FetchError::NotSupported("Not supported".to_string())
    }

    /// Wrap any host error as a transport failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        FetchError::Transport(err.into())
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::NotSupported(_) => "not_supported",
            FetchError::InvalidType(_) => "invalid_type",
            FetchError::Serialization(_) => "serialization",
            FetchError::Transport(_) => "transport",
            FetchError::Rejected(_) => "http_status",
        }
    }

    /// The normalized response of a rejected call, if this is one.
    pub fn response(&self) -> Option<&NormalizedResponse> {
        match self {
            FetchError::Rejected(response) => Some(response),
            _ => None,
        }
    }

    /// Consume the error and return the rejected response, if any.
    pub fn into_response(self) -> Option<NormalizedResponse> {
        match self {
            FetchError::Rejected(response) => Some(*response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseData;

    #[test]
    fn default_messages_and_codes() {
        let err = FetchError::not_supported();
        assert_eq!(err.code(), "not_supported");
        assert_eq!(err.to_string(), "Not supported");

        let err = crate::url::encode_query(&serde_json::json!("flat")).unwrap_err();
        assert_eq!(err.code(), "invalid_type");
        assert_eq!(err.to_string(), "params should be a key-value mapping");
    }

    #[test]
    fn transport_keeps_raw_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = FetchError::transport(io);
        assert_eq!(err.code(), "transport");
        assert_eq!(err.to_string(), "refused");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn rejected_exposes_response() {
        let response = NormalizedResponse {
            ok: false,
            status: 404,
            url: "http://localhost/missing/".to_string(),
            data: ResponseData::Text(String::new()),
            status_text: "Not Found".to_string(),
            headers: Vec::new(),
        };
        let err = FetchError::Rejected(Box::new(response));
        assert_eq!(err.code(), "http_status");
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.response().unwrap().status, 404);
        assert!(!err.into_response().unwrap().ok);
    }
}

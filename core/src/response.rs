//! Normalized response envelope.
//!
//! Every completed call, successful or not, produces the same
//! `NormalizedResponse` shape. The body is read as text and then tried as
//! JSON; a body that is not valid JSON is kept as the raw text instead of
//! failing the call.

use serde::Serialize;
use serde_json::Value;

use crate::http::HttpResponse;

/// Response body: parsed JSON when the text is valid JSON, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Json(Value),
    Text(String),
}

impl ResponseData {
    /// Never fails. Empty or malformed JSON falls back to `Text`.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseData::Json(value),
            Err(_) => ResponseData::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Json(_) => None,
            ResponseData::Text(text) => Some(text),
        }
    }
}

/// Uniform result of a completed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// True iff `status` is in 200..=299.
    pub ok: bool,
    pub status: u16,
    pub url: String,
    pub data: ResponseData,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
}

impl NormalizedResponse {
    pub fn from_http(response: HttpResponse) -> Self {
        Self {
            ok: (200..=299).contains(&response.status),
            status: response.status,
            url: response.url,
            data: ResponseData::parse(response.body),
            status_text: response.status_text,
            headers: response.headers,
        }
    }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

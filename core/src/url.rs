//! URL composition: trailing-slash normalization, query and hash.
//!
//! # Design
//! `compose` is pure. It splits the input on the first `?` into a path and
//! a query-and-hash tail, then splits that tail on the first `#`. The path's
//! trailing slash is forced on or off, and the query and hash are re-attached
//! from either the explicit options or what was embedded in the input string.
//! Explicit options always win; an embedded part is dropped as soon as an
//! explicit one is present.
//!
//! Query options are held as a `serde_json::Value` rather than a typed map so
//! that callers deserializing options from JSON get a proper `InvalidType`
//! error when `query` is not a mapping.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// Everything `encodeURIComponent` escapes: all but ASCII alphanumerics and
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn default_trailing_slash() -> bool {
    true
}

/// A base URL together with its composition options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlOptions {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default = "default_trailing_slash")]
    pub has_trailing_slash: bool,
}

impl UrlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: None,
            hash: None,
            has_trailing_slash: true,
        }
    }

    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn trailing_slash(mut self, has_trailing_slash: bool) -> Self {
        self.has_trailing_slash = has_trailing_slash;
        self
    }

    pub fn compose_options(&self) -> ComposeOptions<'_> {
        ComposeOptions {
            query: self.query.as_ref(),
            hash: self.hash.as_deref(),
            has_trailing_slash: self.has_trailing_slash,
        }
    }

    pub fn compose(&self) -> Result<DecodedUrl, FetchError> {
        compose(&self.url, &self.compose_options())
    }
}

/// Borrowed composition options. `Default` keeps the trailing slash.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions<'a> {
    pub query: Option<&'a Value>,
    pub hash: Option<&'a str>,
    pub has_trailing_slash: bool,
}

impl Default for ComposeOptions<'_> {
    fn default() -> Self {
        Self {
            query: None,
            hash: None,
            has_trailing_slash: true,
        }
    }
}

/// Result of `compose`. `query` and `hash` hold whichever source was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedUrl {
    pub has_trailing_slash: bool,
    pub original_url: String,
    #[serde(rename = "fullURL")]
    pub full_url: String,
    pub query: Option<String>,
    pub hash: Option<String>,
}

/// Compose `url` with the given options into a single URL string.
///
/// Fails with `InvalidType` when a non-empty `query` option is not a
/// key-value mapping.
pub fn compose(url: &str, options: &ComposeOptions<'_>) -> Result<DecodedUrl, FetchError> {
    let (path, tail) = match url.split_once('?') {
        Some((path, tail)) => (path, tail),
        None => (url, ""),
    };
    let (embedded_query, embedded_hash) = tail.split_once('#').unwrap_or((tail, ""));

    let mut full_url = if options.has_trailing_slash {
        if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        }
    } else {
        path.strip_suffix('/').unwrap_or(path).to_string()
    };

    let query = match options.query.filter(|q| is_present(q)) {
        // An empty mapping still overrides the embedded query.
        Some(params) => Some(encode_query(params)?).filter(|q| !q.is_empty()),
        None => non_empty(embedded_query),
    };
    if let Some(query) = &query {
        full_url.push('?');
        full_url.push_str(query);
    }

    let hash = match options.hash.filter(|h| !h.is_empty()) {
        Some(hash) => Some(hash.to_string()),
        None => non_empty(embedded_hash),
    };
    if let Some(hash) = &hash {
        full_url.push('#');
        full_url.push_str(hash);
    }

    log::trace!("composed {url:?} into {full_url:?}");

    Ok(DecodedUrl {
        has_trailing_slash: options.has_trailing_slash,
        original_url: url.to_string(),
        full_url,
        query,
        hash,
    })
}

/// Serialize a key-value mapping as `k1=v1&k2=v2`, percent-encoding both
/// keys and values. Keys keep insertion order. Arrays are treated as
/// mappings keyed by index.
pub fn encode_query(params: &Value) -> Result<String, FetchError> {
    let pairs: Vec<(String, String)> = match params {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), stringify(value)))
            .collect(),
        _ => {
            return Err(FetchError::InvalidType(
                "params should be a key-value mapping".to_string(),
            ))
        }
    };

    Ok(pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&"))
}

/// Whether a query option counts as given. `null`, `false`, `0` and `""`
/// are treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Shortest round-trip form of a float, switching to exponent notation
/// (`1e+21`, `1e-7`) outside `1e-6 <= |f| < 1e21`. Negative zero is `0`.
fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if !f.is_finite() || (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let formatted = format!("{f:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// String form of a query value.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => format_float(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(url: &str) -> DecodedUrl {
        compose(url, &ComposeOptions::default()).unwrap()
    }

    #[test]
    fn appends_trailing_slash_by_default() {
        assert_eq!(plain("http://x/api").full_url, "http://x/api/");
        assert_eq!(plain("http://x/api/").full_url, "http://x/api/");
    }

    #[test]
    fn strips_trailing_slash_when_disabled() {
        let opts = ComposeOptions {
            has_trailing_slash: false,
            ..Default::default()
        };
        assert_eq!(compose("http://x/api/", &opts).unwrap().full_url, "http://x/api");
        assert_eq!(compose("http://x/api", &opts).unwrap().full_url, "http://x/api");
    }

    #[test]
    fn empty_url_becomes_root() {
        assert_eq!(plain("").full_url, "/");
    }

    #[test]
    fn embedded_query_and_hash_are_kept() {
        let decoded = plain("http://x/api?a=1#top");
        assert_eq!(decoded.full_url, "http://x/api/?a=1#top");
        assert_eq!(decoded.query.as_deref(), Some("a=1"));
        assert_eq!(decoded.hash.as_deref(), Some("top"));
        assert_eq!(decoded.original_url, "http://x/api?a=1#top");
    }

    #[test]
    fn explicit_query_overrides_embedded() {
        let query = json!({"b": 2});
        let opts = ComposeOptions {
            query: Some(&query),
            ..Default::default()
        };
        let decoded = compose("http://x/?a=1", &opts).unwrap();
        assert_eq!(decoded.full_url, "http://x/?b=2");
        assert_eq!(decoded.query.as_deref(), Some("b=2"));
    }

    #[test]
    fn explicit_hash_overrides_embedded() {
        let opts = ComposeOptions {
            hash: Some("new"),
            ..Default::default()
        };
        let decoded = compose("http://x/?a=1#old", &opts).unwrap();
        assert_eq!(decoded.full_url, "http://x/?a=1#new");
        assert_eq!(decoded.hash.as_deref(), Some("new"));
    }

    #[test]
    fn empty_hash_option_keeps_embedded() {
        let opts = ComposeOptions {
            hash: Some(""),
            ..Default::default()
        };
        assert_eq!(compose("http://x?q=1#old", &opts).unwrap().full_url, "http://x/?q=1#old");
    }

    #[test]
    fn empty_mapping_drops_query_without_bare_question_mark() {
        let query = json!({});
        let opts = ComposeOptions {
            query: Some(&query),
            ..Default::default()
        };
        let decoded = compose("http://x/?a=1#h", &opts).unwrap();
        assert_eq!(decoded.full_url, "http://x/#h");
        assert_eq!(decoded.query, None);
    }

    #[test]
    fn non_mapping_query_is_invalid_type() {
        let query = json!("not-an-object");
        let opts = ComposeOptions {
            query: Some(&query),
            ..Default::default()
        };
        let err = compose("http://x/", &opts).unwrap_err();
        assert_eq!(err.code(), "invalid_type");
    }

    #[test]
    fn falsy_query_is_ignored() {
        for query in [json!(null), json!(false), json!(0), json!("")] {
            let opts = ComposeOptions {
                query: Some(&query),
                ..Default::default()
            };
            assert_eq!(compose("http://x?a=1", &opts).unwrap().full_url, "http://x/?a=1");
        }
    }

    #[test]
    fn encodes_keys_and_values() {
        let encoded = encode_query(&json!({"a b": "c&d", "e": "ü", "keep": "-_.!~*'()"})).unwrap();
        assert_eq!(encoded, "a%20b=c%26d&e=%C3%BC&keep=-_.!~*'()");
    }

    #[test]
    fn stringifies_values() {
        let encoded = encode_query(&json!({
            "n": 2, "f": 1.5, "t": true, "z": null, "list": [1, null, "x"], "obj": {"k": 1}
        }))
        .unwrap();
        assert_eq!(
            encoded,
            "n=2&f=1.5&t=true&z=null&list=1%2C%2Cx&obj=%5Bobject%20Object%5D"
        );
    }

    #[test]
    fn floats_use_exponent_outside_plain_range() {
        let encoded = encode_query(&json!({
            "big": 1e21, "small": 1e-7, "neg0": -0.0, "plain": 123456.789, "tiny": 0.000001
        }))
        .unwrap();
        assert_eq!(
            encoded,
            "big=1e%2B21&small=1e-7&neg0=0&plain=123456.789&tiny=0.000001"
        );
        assert_eq!(format_float(-2.5e300), "-2.5e+300");
    }

    #[test]
    fn array_query_uses_indices() {
        assert_eq!(encode_query(&json!(["a", "b"])).unwrap(), "0=a&1=b");
    }

    #[test]
    fn split_is_on_first_question_mark() {
        let decoded = plain("http://x/p?a=1?b=2#h#i");
        assert_eq!(decoded.query.as_deref(), Some("a=1?b=2"));
        assert_eq!(decoded.hash.as_deref(), Some("h#i"));
    }

    #[test]
    fn url_options_deserialize_with_defaults() {
        let opts: UrlOptions =
            serde_json::from_value(json!({"url": "http://x/api", "query": {"q": "rust"}})).unwrap();
        assert!(opts.has_trailing_slash);
        assert_eq!(opts.compose().unwrap().full_url, "http://x/api/?q=rust");

        let opts: UrlOptions =
            serde_json::from_value(json!({"url": "http://x/api/", "hasTrailingSlash": false, "hash": "top"}))
                .unwrap();
        assert_eq!(opts.compose().unwrap().full_url, "http://x/api#top");
    }

    #[test]
    fn decoded_url_serializes_like_a_record() {
        let value = serde_json::to_value(plain("http://x")).unwrap();
        assert_eq!(value["fullURL"], "http://x/");
        assert_eq!(value["originalUrl"], "http://x");
        assert_eq!(value["hasTrailingSlash"], true);
    }
}

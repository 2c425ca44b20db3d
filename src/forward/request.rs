//! Inbound request model and projection onto the outbound request.
//!
//! Validation order is fixed: missing parameters, then the allow-list, then
//! the path prefix. The target URL is only built once all three pass.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::forward::allow_list::is_allowed_base;
use crate::forward::error::ForwardError;
use crate::forward::transport::OutboundRequest;

/// Content type sent upstream with POST bodies.
const JSON_REQUEST_CONTENT_TYPE: &str = "application/json";

/// Body sent upstream for a POST without a usable JSON body.
pub const EMPTY_JSON_BODY: &str = "{}";

/// Largest magnitude at which every whole `f64` is also an exact integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// What the forwarder consumes from an inbound HTTP request.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub authorization: Option<HeaderValue>,
    /// Inbound `Content-Type`; decides how the body is pre-parsed.
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, query: Option<&str>) -> Self {
        Self {
            method,
            query: query.map(str::to_owned),
            authorization: None,
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn with_authorization(mut self, value: HeaderValue) -> Self {
        self.authorization = Some(value);
        self
    }

    pub fn with_content_type(mut self, value: HeaderValue) -> Self {
        self.content_type = Some(value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// The `base` and `path` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardParams {
    pub base: Option<String>,
    pub path: Option<String>,
}

impl ForwardParams {
    /// Decode from a raw query string. The first occurrence of a key wins and
    /// empty values count as absent.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "base" => &mut params.base,
                "path" => &mut params.path,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

impl OutboundRequest {
    /// Validate an inbound request and project it onto the upstream call.
    pub fn from_inbound(inbound: &InboundRequest) -> Result<Self, ForwardError> {
        let params = ForwardParams::from_query(inbound.query.as_deref());
        let (Some(base), Some(path)) = (params.base, params.path) else {
            return Err(ForwardError::MissingParameter);
        };
        if !is_allowed_base(&base) {
            return Err(ForwardError::DisallowedTarget);
        }
        if !path.starts_with('/') {
            return Err(ForwardError::MalformedPath);
        }

        let url = build_target(&base, &path).map_err(ForwardError::TargetUrl)?;
        let headers = project_headers(&inbound.method, inbound.authorization.as_ref());
        let body = project_body(&inbound.method, inbound.content_type.as_ref(), &inbound.body)
            .map_err(ForwardError::InvalidBody)?;

        Ok(Self {
            method: inbound.method.clone(),
            url,
            headers,
            body,
        })
    }
}

/// Join `base` (one trailing slash removed) and `path`.
pub fn build_target(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let base = base.strip_suffix('/').unwrap_or(base);
    Url::parse(&format!("{base}{path}"))
}

/// Only `Authorization` is mirrored; POST also gets a JSON content type.
pub fn project_headers(method: &Method, authorization: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = authorization.filter(|value| !value.is_empty()) {
        headers.insert(header::AUTHORIZATION, value.clone());
    }
    if method == Method::POST {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_REQUEST_CONTENT_TYPE),
        );
    }
    headers
}

/// Decode a body the way the inbound content type says.
///
/// `application/json` is parsed (and may fail), `text/plain` becomes a
/// string, a urlencoded form becomes an object whose repeated keys collect
/// into arrays. A missing or any other content type, or an empty body,
/// yields no body.
pub fn parse_body(
    content_type: Option<&HeaderValue>,
    body: &[u8],
) -> Result<Option<Value>, serde_json::Error> {
    let Some(media_type) = content_type.and_then(media_type) else {
        return Ok(None);
    };

    match media_type.as_str() {
        "application/json" => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            serde_json::from_slice(body).map(Some)
        }
        "text/plain" => Ok(Some(Value::String(String::from_utf8_lossy(body).into_owned()))),
        "application/x-www-form-urlencoded" => Ok(Some(parse_form(body))),
        _ => Ok(None),
    }
}

/// POST bodies are pre-parsed and re-serialized; anything falsy (or no body
/// at all) becomes `{}`. Other methods never carry a body.
pub fn project_body(
    method: &Method,
    content_type: Option<&HeaderValue>,
    body: &[u8],
) -> Result<Option<String>, serde_json::Error> {
    if method != Method::POST {
        return Ok(None);
    }

    match parse_body(content_type, body)? {
        Some(mut value) if is_truthy(&value) => {
            normalize_numbers(&mut value);
            serde_json::to_string(&value).map(Some)
        }
        _ => Ok(Some(EMPTY_JSON_BODY.to_string())),
    }
}

/// Lowercased media type without parameters.
fn media_type(value: &HeaderValue) -> Option<String> {
    let raw = value.to_str().ok()?;
    let essence = raw.split(';').next().unwrap_or_default().trim();
    (!essence.is_empty()).then(|| essence.to_ascii_lowercase())
}

fn parse_form(body: &[u8]) -> Value {
    let mut fields = Map::new();
    for (key, value) in form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());
        match fields.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(fields)
}

/// Write whole-valued floats as integers (`1.0` → `1`, `-0.0` → `0`).
fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
                if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                    *value = Value::from(f as i64);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(normalize_numbers),
        Value::Object(fields) => fields.values_mut().for_each(normalize_numbers),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

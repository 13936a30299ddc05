use serde_json::{Map, Value as JsonValue};

use crate::FetchError;

/// HTTP verb of a catalog request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// How the response body is decoded.
    ///
    /// Reads (GET, PUT) return JSON documents; writes (POST, DELETE) return
    /// plain-text acknowledgments.
    pub fn response_kind(self) -> ResponseKind {
        match self {
            Self::Get | Self::Put => ResponseKind::Json,
            Self::Post | Self::Delete => ResponseKind::Text,
        }
    }

    /// Whether an encoded payload travels as the request body rather than
    /// in the query string.
    pub(crate) fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Expected representation of a response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Text,
}

impl ResponseKind {
    /// `Accept` header value advertised for this kind.
    pub fn accept(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain, */*",
        }
    }
}

/// Everything needed to issue one attempt of a request.
///
/// Only `attempt` changes between retries of the same logical request.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    /// `Content-Type` header, omitted when `None`.
    pub content_type: Option<String>,
    /// When `true` the body is already in wire form and is sent as
    /// supplied: strings verbatim, flat objects form-url-encoded. When
    /// `false` the body is serialized to JSON text.
    pub serialize_body: bool,
    pub body: Option<JsonValue>,
    /// Attempt number, `1` for a fresh request.
    pub attempt: u32,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            serialize_body: true,
            body: None,
            attempt: 1,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sends `body` as JSON text.
    pub fn with_json_body(mut self, body: JsonValue) -> Self {
        self.serialize_body = false;
        self.body = Some(body);
        self
    }

    /// Sends `body` as supplied (see [`RequestDescriptor::serialize_body`]).
    pub fn with_raw_body(mut self, body: impl Into<JsonValue>) -> Self {
        self.serialize_body = true;
        self.body = Some(body.into());
        self
    }

    /// Starts counting attempts at `attempt` instead of `1`.
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// The same request, one attempt later.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt.saturating_add(1),
            ..self.clone()
        }
    }

    /// Encodes the payload and resolves the URL actually requested.
    ///
    /// GET and DELETE never carry a request body; any encoded payload is
    /// appended to the query string instead.
    pub(crate) fn encode(&self) -> Result<EncodedRequest, FetchError> {
        let payload = match &self.body {
            None => None,
            Some(body) if self.serialize_body => encode_raw(body)?,
            Some(body) => Some(serde_json::to_string(body).map_err(|err| {
                FetchError::Encode(format!("body is not serializable as JSON: {err}"))
            })?),
        };

        if self.method.carries_body() {
            return Ok(EncodedRequest {
                url: self.url.clone(),
                body: payload,
            });
        }

        let url = match payload.filter(|query| !query.is_empty()) {
            Some(query) => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{separator}{query}", self.url)
            }
            None => self.url.clone(),
        };
        Ok(EncodedRequest { url, body: None })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EncodedRequest {
    pub url: String,
    pub body: Option<String>,
}

fn encode_raw(body: &JsonValue) -> Result<Option<String>, FetchError> {
    match body {
        JsonValue::Null => Ok(None),
        JsonValue::String(text) => Ok(Some(text.clone())),
        JsonValue::Bool(_) | JsonValue::Number(_) => Ok(Some(body.to_string())),
        JsonValue::Array(items) if items.is_empty() => Ok(None),
        JsonValue::Array(_) => Err(FetchError::Encode(
            "a raw body must be a string or a flat object, got a non-empty array".to_owned(),
        )),
        JsonValue::Object(fields) => encode_form(fields).map(Some),
    }
}

fn encode_form(fields: &Map<String, JsonValue>) -> Result<String, FetchError> {
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            JsonValue::Array(items) => {
                let key = format!("{key}[]");
                for item in items {
                    pairs.push(form_pair(&key, item)?);
                }
            }
            _ => pairs.push(form_pair(key, value)?),
        }
    }
    Ok(pairs.join("&"))
}

fn form_pair(key: &str, value: &JsonValue) -> Result<String, FetchError> {
    let value = match value {
        JsonValue::Null => String::new(),
        JsonValue::String(text) => text.clone(),
        JsonValue::Bool(_) | JsonValue::Number(_) => value.to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            return Err(FetchError::Encode(format!(
                "form field '{key}' must hold a scalar value"
            )))
        }
    };
    Ok(format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(&value)
    ))
}

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::{request::ResponseKind, FetchError};

/// Decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

/// A successful response, decoded according to the request method.
#[derive(Clone, Debug)]
pub struct Success {
    pub data: Payload,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
}

impl Success {
    /// Decoded JSON document, if the response was read as JSON.
    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.data {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Plain-text acknowledgment, if the response was read as text.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    /// Deserializes the payload into `T`.
    ///
    /// Text payloads are parsed as JSON first.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let decoded = match &self.data {
            Payload::Json(value) => serde_json::from_value(value.clone()),
            Payload::Text(text) => serde_json::from_str(text),
        };
        decoded.map_err(|err| FetchError::Decode {
            status: self.status,
            message: format!("unexpected response shape: {err}"),
            body: match &self.data {
                Payload::Json(value) => value.to_string(),
                Payload::Text(text) => text.clone(),
            },
        })
    }
}

pub(crate) fn decode_payload(
    kind: ResponseKind,
    status: u16,
    body: String,
) -> Result<Payload, FetchError> {
    match kind {
        ResponseKind::Text => Ok(Payload::Text(body)),
        // no content: nothing to parse
        ResponseKind::Json if status == 204 => Ok(Payload::Json(serde_json::Value::Null)),
        ResponseKind::Json => serde_json::from_str(&body)
            .map(Payload::Json)
            .map_err(|err| FetchError::Decode {
                status,
                message: format!("invalid JSON response: {err}"),
                body,
            }),
    }
}

//! Decoded CRUD responses.

use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    model::response_type::ResponseType,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A response body decoded according to the session's [`ResponseType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `array`: the parsed JSON document.
    Array(Value),
    /// `object`: the parsed top-level JSON object.
    Object(Map<String, Value>),
    /// `json`: the JSON text exactly as received.
    Json(String),
    /// `html`, `extjs` and `text`: the body exactly as received.
    Text(String),
    /// `png`: the image bytes exactly as received.
    Png(Vec<u8>),
    /// `pngb64`: `data:image/png;base64,<body>`.
    PngBase64(String),
}

impl ApiResponse {
    /// Decodes a raw body.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Decode` if the body does not fit the format.
    pub fn decode(format: ResponseType, body: Vec<u8>) -> ProxmoxResult<Self> {
        match format {
            ResponseType::Array => serde_json::from_slice(&body)
                .map(ApiResponse::Array)
                .map_err(|e| ProxmoxError::Decode(format!("Failed to parse response: {}", e))),
            ResponseType::Object => match serde_json::from_slice::<Value>(&body) {
                Ok(Value::Object(map)) => Ok(ApiResponse::Object(map)),
                Ok(other) => Err(ProxmoxError::Decode(format!(
                    "Expected a JSON object, got {}",
                    json_kind(&other)
                ))),
                Err(e) => Err(ProxmoxError::Decode(format!(
                    "Failed to parse response: {}",
                    e
                ))),
            },
            ResponseType::Json => utf8(body).map(ApiResponse::Json),
            ResponseType::Html | ResponseType::Extjs | ResponseType::Text => {
                utf8(body).map(ApiResponse::Text)
            }
            ResponseType::Png => Ok(ApiResponse::Png(body)),
            ResponseType::PngB64 => Ok(ApiResponse::PngBase64(format!(
                "data:image/png;base64,{}",
                STANDARD.encode(&body)
            ))),
        }
    }

    /// Deserializes a JSON response into `T`.
    ///
    /// Works for `Array`, `Object`, `Json` and `Text` (the latter covers `extjs`).
    ///
    /// # Errors
    /// Returns `ProxmoxError::Decode` for image responses or if `T` does not match.
    pub fn deserialize<T: DeserializeOwned>(&self) -> ProxmoxResult<T> {
        let result = match self {
            ApiResponse::Array(value) => T::deserialize(value),
            ApiResponse::Object(map) => T::deserialize(Value::Object(map.clone())),
            ApiResponse::Json(text) | ApiResponse::Text(text) => serde_json::from_str(text),
            ApiResponse::Png(_) | ApiResponse::PngBase64(_) => {
                return Err(ProxmoxError::Decode(
                    "Image responses cannot be deserialized".to_string(),
                ));
            }
        };
        result.map_err(|e| ProxmoxError::Decode(format!("Failed to deserialize response: {}", e)))
    }

    /// The `data` member of a parsed JSON envelope, if there is one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiResponse::Array(value) => value.get("data"),
            ApiResponse::Object(map) => map.get("data"),
            _ => None,
        }
    }
}

fn utf8(body: Vec<u8>) -> ProxmoxResult<String> {
    String::from_utf8(body)
        .map_err(|e| ProxmoxError::Decode(format!("Response is not valid UTF-8: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

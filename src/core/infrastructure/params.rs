//! Flattening of request parameters into form/query pairs.

use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde_json::Value;

/// Encodes request parameters as `(key, value)` pairs.
///
/// `None` and `null` mean "no parameters". Anything other than a JSON object
/// is rejected, as are nested objects and nested arrays. Booleans are sent as
/// `1`/`0`, arrays repeat their key once per element and `null` members are
/// left out.
pub(crate) fn encode_params(params: Option<&Value>) -> ProxmoxResult<Vec<(String, String)>> {
    let map = match params {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ProxmoxError::InvalidArgument(format!(
                "Parameters must be a key-value mapping, got {}",
                describe(other)
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    let encoded = scalar(key, item)?.ok_or_else(|| {
                        ProxmoxError::InvalidArgument(format!(
                            "Parameter '{}' contains a null element",
                            key
                        ))
                    })?;
                    pairs.push((key.clone(), encoded));
                }
            }
            other => {
                if let Some(encoded) = scalar(key, other)? {
                    pairs.push((key.clone(), encoded));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(key: &str, value: &Value) -> ProxmoxResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Array(_) | Value::Object(_) => Err(ProxmoxError::InvalidArgument(format!(
            "Parameter '{}' must be a scalar or a list of scalars",
            key
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

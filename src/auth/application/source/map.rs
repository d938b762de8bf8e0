//! Key-value mappings as credential sources.

use super::CredentialSource;
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

impl<K, V, S> CredentialSource for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_string())
    }
}

impl<K, V> CredentialSource for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| value.as_ref().to_string())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> CredentialSource for [(K, V)] {
    fn field(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref().to_string())
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> CredentialSource for [(K, V); N] {
    fn field(&self, name: &str) -> Option<String> {
        self.as_slice().field(name)
    }
}

impl CredentialSource for Map<String, Value> {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).and_then(scalar_to_string)
    }
}

/// Only JSON objects expose fields. Strings, numbers and positional arrays
/// have no keys, so they never satisfy the resolver.
impl CredentialSource for Value {
    fn field(&self, name: &str) -> Option<String> {
        match self {
            Value::Object(map) => map.field(name),
            _ => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

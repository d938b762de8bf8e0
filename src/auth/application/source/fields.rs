use super::{CredentialSource, field};
use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

/// A plain struct of named credential fields.
///
/// Deserializes from the same keys a mapping uses (`token-id`,
/// `token-secret`), so a JSON credentials file can be loaded directly.
///
/// # Examples
///
/// ```
/// use proxmox_api::{CredentialFields, CredentialResolver};
///
/// let fields = CredentialFields::token_auth("pbs.example.com", "backup@pbs!ci", "5f2c")
///     .with_system("pbs");
/// let credentials = CredentialResolver::resolve(&fields).unwrap();
/// assert_eq!(credentials.token(), "PBSAPIToken=backup@pbs!ci=5f2c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialFields {
    #[serde(default, deserialize_with = "string_or_number")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub realm: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub system: Option<String>,
    #[serde(default, rename = "token-id", deserialize_with = "string_or_number")]
    pub token_id: Option<String>,
    #[serde(default, rename = "token-secret", deserialize_with = "string_or_number")]
    pub token_secret: Option<String>,
}

impl CredentialFields {
    pub fn password_auth(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: Some(hostname.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn token_auth(
        hostname: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            hostname: Some(hostname.into()),
            token_id: Some(token_id.into()),
            token_secret: Some(token_secret.into()),
            ..Default::default()
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Loads fields from a JSON file containing a single object.
    ///
    /// # Errors
    /// Returns `ProxmoxError::MalformedCredentials` if the file cannot be read
    /// or is not a JSON object of string/number fields.
    pub async fn from_json_file(path: impl AsRef<Path>) -> ProxmoxResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ProxmoxError::MalformedCredentials(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let invalid = |reason: String| {
            ProxmoxError::MalformedCredentials(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                reason
            ))
        };

        // Derived struct deserialization would also accept a positional array.
        let value: Value = serde_json::from_str(&contents).map_err(|e| invalid(e.to_string()))?;
        if !value.is_object() {
            return Err(invalid("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }
}

impl CredentialSource for CredentialFields {
    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            field::HOSTNAME => &self.hostname,
            field::USERNAME => &self.username,
            field::PASSWORD => &self.password,
            field::REALM => &self.realm,
            field::PORT => &self.port,
            field::SYSTEM => &self.system,
            field::TOKEN_ID => &self.token_id,
            field::TOKEN_SECRET => &self.token_secret,
            _ => return None,
        };
        value.clone()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

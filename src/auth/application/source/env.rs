use super::CredentialSource;

const DEFAULT_PREFIX: &str = "PROXMOX_";

/// Reads credential fields from environment variables.
///
/// Field `token-id` is looked up as `PROXMOX_TOKEN_ID` with the default prefix.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Create source using the default `PROXMOX_` prefix.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Create source with a custom variable prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn var_name(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field.to_ascii_uppercase().replace('-', "_"))
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvSource {
    fn field(&self, name: &str) -> Option<String> {
        std::env::var(self.var_name(name)).ok()
    }
}

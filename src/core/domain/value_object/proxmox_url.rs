use crate::core::domain::error::ValidationError;
use std::fmt;

const ALLOWED_SCHEMES: [&str; 2] = ["https", "http"];
const MAX_URL_LENGTH: usize = 2083;

/// A validated API base URL such as `https://pve.example.com:8006/api2`.
///
/// Request URLs are produced by appending a response format segment and a
/// resource path with [`ProxmoxUrl::endpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl(String);

impl ProxmoxUrl {
    /// Parses and validates an API base URL.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_url(&value)?;
        Ok(Self(value.trim_end_matches('/').to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds `<base>/<format>/<resource>`; `resource` is expected to start with `/`.
    #[must_use]
    pub fn endpoint(&self, format: &str, resource: &str) -> String {
        format!("{}/{}{}", self.0, format, resource)
    }
}

impl fmt::Display for ProxmoxUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates an API base URL.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme. Must be one of: {}",
            ALLOWED_SCHEMES.join(", ")
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::Field {
            field: "hostname".to_string(),
            message: "URL has no host".to_string(),
        });
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::Format(
            "API base URL cannot carry a query or fragment".to_string(),
        ));
    }

    Ok(())
}

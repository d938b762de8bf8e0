use crate::core::domain::error::ValidationError;

/// Header that carries the CSRF prevention token on state-changing requests.
pub const CSRF_HEADER_NAME: &str = "CSRFPreventionToken";

/// A Proxmox CSRF protection token.
#[derive(Debug, Clone)]
pub struct ProxmoxCSRFToken(String);

impl ProxmoxCSRFToken {
    /// Creates a validated CSRF token.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_csrf_token(&value)?;
        Ok(Self(value))
    }

    /// Creates a new CSRF token without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `(name, value)` pair attached to state-changing requests.
    #[must_use]
    pub fn as_header(&self) -> (String, String) {
        (CSRF_HEADER_NAME.to_string(), self.0.clone())
    }
}

/// Validates the format of a CSRF token string.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "csrf_token".to_string(),
            message: "CSRF token cannot be empty".to_string(),
        });
    }
    if token.chars().any(|c| c.is_control()) {
        return Err(ValidationError::Format(
            "CSRF token cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_token() {
        let token = ProxmoxCSRFToken::new("4EEC61E2:lnPjvq8ShBOBAOw".to_string()).unwrap();
        assert_eq!(token.as_str(), "4EEC61E2:lnPjvq8ShBOBAOw");
        assert_eq!(
            token.as_header(),
            (
                "CSRFPreventionToken".to_string(),
                "4EEC61E2:lnPjvq8ShBOBAOw".to_string()
            )
        );
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(validate_csrf_token("").is_err());
        assert!(validate_csrf_token("4EEC61E2:abc\r\nX-Injected: 1").is_err());
    }
}

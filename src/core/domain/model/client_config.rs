use crate::core::domain::{error::ValidationError, model::response_type::ResponseType};
use std::time::Duration;

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Session configuration collected by the client builder.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Format of CRUD responses until changed on the client.
    pub response_type: ResponseType,
    /// `https` when true, plain `http` otherwise.
    pub secure: bool,
    pub accept_invalid_certs: bool,
    /// Per-request timeout handed to the HTTP executor.
    pub timeout: Option<Duration>,
    pub rate_limit: Option<RateLimitConfig>,
    /// Minimum zxcvbn score for password credentials; unchecked when `None`.
    pub min_password_score: Option<zxcvbn::Score>,
    /// Defer the ticket login until the first request.
    pub lazy_login: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            response_type: ResponseType::default(),
            secure: true,
            accept_invalid_certs: false,
            timeout: None,
            rate_limit: None,
            min_password_score: None,
            lazy_login: false,
        }
    }
}

impl ClientConfig {
    /// Rate limits are checked when the limiter is built.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ValidationError::Field {
                field: "timeout".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

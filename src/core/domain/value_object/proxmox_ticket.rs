use crate::core::domain::error::ValidationError;
use std::fmt;

/// Name of the cookie that carries the session ticket.
pub const AUTH_COOKIE_NAME: &str = "PVEAuthCookie";

/// A Proxmox authentication ticket.
#[derive(Clone)]
pub struct ProxmoxTicket(String);

impl ProxmoxTicket {
    /// Creates a validated ticket.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_ticket(&value)?;
        Ok(Self(value))
    }

    /// Creates a new ticket without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the ticket value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the ticket as a cookie header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("{}={}", AUTH_COOKIE_NAME, self.0)
    }
}

impl fmt::Debug for ProxmoxTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxTicket([REDACTED])")
    }
}

/// Validates a ticket string.
///
/// Tickets are opaque (`PVE:`, `PBS:` and `PMG:` prefixes are all issued), so
/// only the shape of a cookie value is checked.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.is_empty() {
        return Err(ValidationError::Field {
            field: "ticket".to_string(),
            message: "Ticket cannot be empty".to_string(),
        });
    }
    if ticket.chars().any(|c| c.is_whitespace() || c == ';') {
        return Err(ValidationError::Format(
            "Ticket contains characters not allowed in a cookie value".to_string(),
        ));
    }
    Ok(())
}

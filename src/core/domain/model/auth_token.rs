use crate::core::domain::value_object::{ProxmoxCSRFToken, ProxmoxTicket};

/// The session material issued by a successful ticket login.
///
/// Written once per login and treated as valid until the next login.
#[derive(Debug, Clone)]
pub struct AuthToken {
    csrf_token: ProxmoxCSRFToken,
    ticket: ProxmoxTicket,
    username: String,
}

impl AuthToken {
    pub fn new(csrf_token: ProxmoxCSRFToken, ticket: ProxmoxTicket, username: String) -> Self {
        Self {
            csrf_token,
            ticket,
            username,
        }
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &ProxmoxCSRFToken {
        &self.csrf_token
    }

    /// The user the server issued the ticket for, e.g. `root@pam`.
    pub fn username(&self) -> &str {
        &self.username
    }
}

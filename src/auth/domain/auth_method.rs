//! The two mutually exclusive ways a session authenticates its requests.

use crate::core::{
    domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{auth_token::AuthToken, credentials::Credentials},
    },
    infrastructure::http_executor::HttpRequest,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Observable authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Ticket auth, no login attempted yet.
    Unauthenticated,
    /// Ticket auth, a login request is in flight.
    Authenticating,
    /// Ticket auth, a ticket is held.
    Authenticated,
    /// Ticket auth, the last login failed.
    Failed,
    /// API token auth; always ready.
    ApiToken,
}

#[derive(Debug, Default)]
pub(crate) enum TicketState {
    #[default]
    Unauthenticated,
    /// A login is in flight; the ticket it replaces stays usable until then.
    Authenticating { previous: Option<AuthToken> },
    Authenticated(AuthToken),
    Failed,
}

impl TicketState {
    fn usable_token(&self) -> Option<&AuthToken> {
        match self {
            TicketState::Authenticated(token)
            | TicketState::Authenticating {
                previous: Some(token),
            } => Some(token),
            _ => None,
        }
    }
}

/// Selected once per session from [`Credentials::using_api_token`].
#[derive(Debug)]
pub(crate) enum AuthMethod {
    Ticket {
        state: RwLock<TicketState>,
        /// Held for the whole login round trip; at most one login runs at a time.
        login_gate: Mutex<()>,
    },
    ApiToken(SecretString),
}

impl AuthMethod {
    pub fn for_credentials(credentials: &Credentials) -> Self {
        if credentials.using_api_token() {
            AuthMethod::ApiToken(SecretString::from(credentials.token()))
        } else {
            AuthMethod::Ticket {
                state: RwLock::new(TicketState::default()),
                login_gate: Mutex::new(()),
            }
        }
    }

    pub async fn state(&self) -> AuthState {
        match self {
            AuthMethod::ApiToken(_) => AuthState::ApiToken,
            AuthMethod::Ticket { state, .. } => match &*state.read().await {
                TicketState::Unauthenticated => AuthState::Unauthenticated,
                TicketState::Authenticating { .. } => AuthState::Authenticating,
                TicketState::Authenticated(_) => AuthState::Authenticated,
                TicketState::Failed => AuthState::Failed,
            },
        }
    }

    /// The ticket requests are currently signed with, if any.
    pub async fn token(&self) -> Option<AuthToken> {
        match self {
            AuthMethod::ApiToken(_) => None,
            AuthMethod::Ticket { state, .. } => state.read().await.usable_token().cloned(),
        }
    }

    /// Waits for any running login to finish and holds off new ones while the
    /// guard lives. Returns `None` for API tokens, which never log in.
    pub async fn lock_login(&self) -> Option<MutexGuard<'_, ()>> {
        match self {
            AuthMethod::ApiToken(_) => None,
            AuthMethod::Ticket { login_gate, .. } => Some(login_gate.lock().await),
        }
    }

    /// Moves a ticket session to `Authenticating`, keeping the current ticket.
    /// Callers hold the guard from [`AuthMethod::lock_login`].
    pub async fn begin_login(&self) {
        if let AuthMethod::Ticket { state, .. } = self {
            let mut state = state.write().await;
            let previous = match std::mem::take(&mut *state) {
                TicketState::Authenticated(token) => Some(token),
                TicketState::Authenticating { previous } => previous,
                TicketState::Unauthenticated | TicketState::Failed => None,
            };
            *state = TicketState::Authenticating { previous };
        }
    }

    /// Records the outcome of a login started with [`AuthMethod::begin_login`].
    pub async fn finish_login(&self, token: Option<AuthToken>) {
        if let AuthMethod::Ticket { state, .. } = self {
            *state.write().await = match token {
                Some(token) => TicketState::Authenticated(token),
                None => TicketState::Failed,
            };
        }
    }

    /// Attaches the authentication material for `request.method`.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Authentication` if a ticket session holds no ticket.
    pub async fn apply(&self, request: &mut HttpRequest) -> ProxmoxResult<()> {
        match self {
            AuthMethod::ApiToken(token) => {
                request.headers.push((
                    "Authorization".to_string(),
                    token.expose_secret().to_string(),
                ));
                Ok(())
            }
            AuthMethod::Ticket { state, .. } => {
                let state = state.read().await;
                match (state.usable_token(), &*state) {
                    (Some(token), _) => {
                        request
                            .headers
                            .push(("Cookie".to_string(), token.ticket().as_cookie_header()));
                        if !request.method.is_read() {
                            request.headers.push(token.csrf_token().as_header());
                        }
                        Ok(())
                    }
                    (None, TicketState::Failed) => Err(ProxmoxError::Authentication(
                        "The last login failed; call login() to issue a new one".to_string(),
                    )),
                    (None, _) => Err(ProxmoxError::Authentication("Not logged in".to_string())),
                }
            }
        }
    }
}

mod auth;
mod core;


pub use crate::auth::{
    application::{
        service::credential_resolver::{CredentialResolver, PASSWORD_KEYS, TOKEN_KEYS},
        source::{
            CredentialFields, CredentialSource, CredentialSourceExt, EnvSource, FnSource, Layered,
            field,
        },
    },
    domain::auth_method::AuthState,
};
pub use crate::core::{
    domain::{
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        model::{
            api_response::ApiResponse,
            auth_token::AuthToken,
            client_config::{ClientConfig, RateLimitConfig},
            credentials::Credentials,
            response_type::ResponseType,
        },
        value_object::{ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUrl},
    },
    infrastructure::http_executor::{
        HttpExecutor, HttpMethod, HttpRequest, HttpResponse, ReqwestExecutor, TransportError,
    },
};
pub use zxcvbn::Score as PasswordScore;

use crate::core::{
    domain::value_object::validate_password_strength, infrastructure::api_client::ApiClient,
};
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

/// A client session against a Proxmox VE, Backup Server or Mail Gateway API
///
/// The session authenticates either with a ticket obtained from
/// `POST /access/ticket` or with a pre-issued API token, depending on which
/// credential fields were supplied. Token fields win when both are present.
///
/// # Examples
///
/// ```no_run
/// use proxmox_api::{CredentialFields, ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let credentials = CredentialFields::password_auth("proxmox.example.com", "root", "secret");
///     let client = ProxmoxClient::builder()
///         .credentials(&credentials)?
///         .accept_invalid_certs(true)
///         .build()
///         .await?;
///
///     let nodes = client.get("/nodes", None).await?;
///     println!("{:?}", nodes.data());
///     Ok(())
/// }
/// ```
pub struct ProxmoxClient {
    api_client: ApiClient,
}

/// Builder for ProxmoxClient configuration
#[derive(Default)]
pub struct ProxmoxClientBuilder {
    credentials: Option<Credentials>,
    config: ClientConfig,
    executor: Option<Arc<dyn HttpExecutor>>,
}

impl ProxmoxClientBuilder {
    /// Resolves the session credentials from any [`CredentialSource`].
    ///
    /// # Errors
    /// Returns `ProxmoxError::MalformedCredentials` if the source holds
    /// neither a complete password nor a complete token key set.
    pub fn credentials<S: CredentialSource + ?Sized>(mut self, source: &S) -> ProxmoxResult<Self> {
        self.credentials = Some(CredentialResolver::resolve(source)?);
        Ok(self)
    }

    /// Uses already resolved credentials.
    pub fn resolved_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.config.response_type = response_type;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Throttles CRUD requests client-side. Logins are never throttled.
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    /// Rejects password credentials scoring below `score` before any login.
    pub fn min_password_score(mut self, score: PasswordScore) -> Self {
        self.config.min_password_score = Some(score);
        self
    }

    /// Defers the ticket login until the first request.
    pub fn lazy_login(mut self, lazy: bool) -> Self {
        self.config.lazy_login = lazy;
        self
    }

    /// Replaces the default reqwest executor.
    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Builds the client and, unless `lazy_login` is set, logs in.
    ///
    /// # Errors
    /// - `ProxmoxError::Validation` if no credentials were set, the
    ///   configuration is invalid or the password is below the minimum score
    /// - `ProxmoxError::Connection` if the HTTP client cannot be created
    /// - whatever the login returns for ticket sessions
    pub async fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let credentials = self.credentials.ok_or_else(|| ValidationError::Field {
            field: "credentials".to_string(),
            message: "Credentials are required".to_string(),
        })?;

        if !credentials.using_api_token() {
            validate_password_strength(
                credentials.password(),
                &[credentials.username(), credentials.hostname()],
                self.config.min_password_score,
            )?;
        }

        let executor: Arc<dyn HttpExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(
                ReqwestExecutor::new(self.config.accept_invalid_certs, self.config.timeout)
                    .map_err(|e| {
                        ProxmoxError::Connection(format!("Failed to create HTTP client: {}", e))
                    })?,
            ),
        };

        let api_client = ApiClient::new(credentials, &self.config, executor)?;
        tracing::debug!(api_url = %api_client.api_url(), "client configured");

        let client = ProxmoxClient { api_client };
        if !self.config.lazy_login {
            client.login().await?;
        }
        Ok(client)
    }
}

impl fmt::Debug for ProxmoxClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxClientBuilder")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("custom_executor", &self.executor.is_some())
            .finish()
    }
}

impl ProxmoxClient {
    /// Creates a new builder for ProxmoxClient configuration
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    /// Resolves `source` and connects with the default configuration.
    ///
    /// # Errors
    /// See [`ProxmoxClientBuilder::credentials`] and [`ProxmoxClientBuilder::build`].
    pub async fn connect<S: CredentialSource + ?Sized>(source: &S) -> ProxmoxResult<Self> {
        Self::builder().credentials(source)?.build().await
    }

    /// Authenticates with the Proxmox server
    ///
    /// Ticket sessions issue one `POST /access/ticket`; API token sessions
    /// return immediately. Calling it again replaces the held ticket.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - The server rejects the credentials (the transport error, unmodified)
    /// - The server is unreachable
    /// - The response lacks a ticket or CSRF token
    pub async fn login(&self) -> ProxmoxResult<()> {
        self.api_client.login().await
    }

    /// Returns true if requests can be sent: a ticket is held or an API token is in use
    pub async fn is_authenticated(&self) -> bool {
        matches!(
            self.api_client.auth_state().await,
            AuthState::Authenticated | AuthState::ApiToken
        )
    }

    pub async fn auth_state(&self) -> AuthState {
        self.api_client.auth_state().await
    }

    /// Returns the current ticket and CSRF token if a ticket login succeeded
    pub async fn auth_token(&self) -> Option<AuthToken> {
        self.api_client.auth_token().await
    }

    pub fn credentials(&self) -> &Credentials {
        self.api_client.credentials()
    }

    pub fn response_type(&self) -> ResponseType {
        self.api_client.response_type()
    }

    /// Sets the response format by name. Unrecognized names select `array`.
    pub fn set_response_type(&mut self, response_type: impl AsRef<str>) {
        self.api_client
            .set_response_type(ResponseType::parse(response_type.as_ref()));
    }

    pub fn set_response_format(&mut self, response_type: ResponseType) {
        self.api_client.set_response_type(response_type);
    }

    /// `GET {api}/{format}{path}`, parameters in the query string.
    ///
    /// # Errors
    /// `InvalidArgument` for non-mapping parameters or a relative path, before
    /// any network call; otherwise the transport or decoding error.
    pub async fn get(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.api_client.get(path, params).await
    }

    /// `POST {api}/{format}{path}` with a form-encoded body.
    pub async fn create(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.api_client.create(path, params).await
    }

    /// `PUT {api}/{format}{path}` with a form-encoded body.
    pub async fn set(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.api_client.set(path, params).await
    }

    /// `DELETE {api}/{format}{path}` with a form-encoded body.
    pub async fn delete(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.api_client.delete(path, params).await
    }
}

impl fmt::Debug for ProxmoxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxClient")
            .field("api_client", &self.api_client)
            .finish()
    }
}

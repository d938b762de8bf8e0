use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::{
        domain::{
            error::{ProxmoxError, ProxmoxResult},
            model::{auth_token::AuthToken, credentials::Credentials},
            value_object::{ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUrl},
        },
        infrastructure::http_executor::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse},
    },
};

const LOGIN_PATH: &str = "/access/ticket";

/// Performs the interactive ticket login.
///
/// One `POST {api}/json/access/ticket` per call. Transport failures, including
/// a rejected login, are returned exactly as the executor produced them.
pub struct LoginService {
    default_headers: Vec<(String, String)>,
}

impl LoginService {
    pub fn new() -> Self {
        Self {
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
        }
    }

    pub async fn execute(
        &self,
        executor: &dyn HttpExecutor,
        credentials: &Credentials,
        api_url: &ProxmoxUrl,
    ) -> ProxmoxResult<AuthToken> {
        let request = self.build_login_request(credentials, api_url);
        tracing::debug!(
            url = %request.url,
            username = credentials.username(),
            realm = credentials.realm(),
            "requesting ticket"
        );

        let response = executor.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, "login rejected");
            ProxmoxError::from(e)
        })?;

        self.handle_successful_login(credentials, response)
    }

    fn build_login_request(&self, credentials: &Credentials, api_url: &ProxmoxUrl) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Post, api_url.endpoint("json", LOGIN_PATH));
        request.headers = self.default_headers.clone();
        request.form = LoginRequest::from_credentials(credentials).into_form();
        request
    }

    fn handle_successful_login(
        &self,
        credentials: &Credentials,
        response: HttpResponse,
    ) -> ProxmoxResult<AuthToken> {
        let login_response: LoginResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ProxmoxError::Decode(format!("Failed to parse login response: {}", e)))?;

        let ticket = ProxmoxTicket::new(login_response.data.ticket)?;
        let csrf_token = ProxmoxCSRFToken::new(login_response.data.csrf_token)?;
        let username = login_response
            .data
            .username
            .unwrap_or_else(|| format!("{}@{}", credentials.username(), credentials.realm()));

        tracing::debug!(username = %username, "ticket issued");
        Ok(AuthToken::new(csrf_token, ticket, username))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}

//! Internal dispatcher that authenticates and issues CRUD requests.

use crate::{
    auth::{
        application::service::login_service::LoginService,
        domain::auth_method::{AuthMethod, AuthState},
    },
    core::{
        domain::{
            error::{ProxmoxError, ProxmoxResult, ValidationError},
            model::{
                api_response::ApiResponse, auth_token::AuthToken, client_config::ClientConfig,
                credentials::Credentials, response_type::ResponseType,
            },
            value_object::ProxmoxUrl,
        },
        infrastructure::{
            http_executor::{HttpExecutor, HttpMethod, HttpRequest},
            params::encode_params,
        },
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Internal HTTP client that attaches authentication to each request and
/// decodes the response in the session's current [`ResponseType`].
///
/// Ticket sessions add `Cookie: PVEAuthCookie=...` to every request and
/// `CSRFPreventionToken` to every non-GET request; token sessions add
/// `Authorization: PVEAPIToken=...`. Nothing is retried.
pub struct ApiClient {
    executor: Arc<dyn HttpExecutor>,
    credentials: Credentials,
    api_url: ProxmoxUrl,
    auth: AuthMethod,
    response_type: ResponseType,
    lazy_login: bool,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. Ticket sessions start unauthenticated.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Validation` if the configuration, the rate limit
    /// or the API URL derived from the credentials is invalid.
    pub fn new(
        credentials: Credentials,
        config: &ClientConfig,
        executor: Arc<dyn HttpExecutor>,
    ) -> ProxmoxResult<Self> {
        config.validate()?;
        let api_url = ProxmoxUrl::new(credentials.api_url_with_scheme(config.secure))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero(rl.requests_per_second, "requests_per_second")?;
                let burst = non_zero(rl.burst_size, "burst_size")?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            executor,
            auth: AuthMethod::for_credentials(&credentials),
            credentials,
            api_url,
            response_type: config.response_type,
            lazy_login: config.lazy_login,
            rate_limiter,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api_url(&self) -> &ProxmoxUrl {
        &self.api_url
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Takes effect on the next request.
    pub fn set_response_type(&mut self, response_type: ResponseType) {
        self.response_type = response_type;
    }

    pub async fn auth_state(&self) -> AuthState {
        self.auth.state().await
    }

    pub async fn auth_token(&self) -> Option<AuthToken> {
        self.auth.token().await
    }

    /// Issues a ticket login. A no-op for API token sessions.
    ///
    /// Logins are serialized. Requests started meanwhile wait for the outcome;
    /// requests already past that check still carry the previous ticket.
    ///
    /// # Errors
    /// Returns the executor's error unmodified if the login is rejected; the
    /// session is then `Failed` until the next successful login.
    pub async fn login(&self) -> ProxmoxResult<()> {
        let Some(_gate) = self.auth.lock_login().await else {
            tracing::debug!("API token session, skipping login");
            return Ok(());
        };
        self.run_login().await
    }

    /// Performs the login round trip. Callers hold the login gate.
    async fn run_login(&self) -> ProxmoxResult<()> {
        self.auth.begin_login().await;
        let result = LoginService::new()
            .execute(self.executor.as_ref(), &self.credentials, &self.api_url)
            .await;

        match result {
            Ok(token) => {
                self.auth.finish_login(Some(token)).await;
                Ok(())
            }
            Err(e) => {
                self.auth.finish_login(None).await;
                Err(e)
            }
        }
    }

    /// Performs a GET request; parameters go in the query string.
    pub async fn get(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.execute_request(HttpMethod::Get, path, params).await
    }

    /// Performs a POST request with a form-encoded body.
    pub async fn create(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.execute_request(HttpMethod::Post, path, params).await
    }

    /// Performs a PUT request with a form-encoded body.
    pub async fn set(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.execute_request(HttpMethod::Put, path, params).await
    }

    /// Performs a DELETE request with a form-encoded body.
    pub async fn delete(&self, path: &str, params: Option<&Value>) -> ProxmoxResult<ApiResponse> {
        self.execute_request(HttpMethod::Delete, path, params).await
    }

    /// Core request execution method. Arguments are checked before anything
    /// touches the network.
    async fn execute_request(
        &self,
        method: HttpMethod,
        path: &str,
        params: Option<&Value>,
    ) -> ProxmoxResult<ApiResponse> {
        if !path.starts_with('/') {
            return Err(ProxmoxError::InvalidArgument(format!(
                "Resource path must start with '/': {}",
                path
            )));
        }
        let form = encode_params(params)?;

        self.ensure_authenticated().await?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let response_type = self.response_type;
        let mut request = HttpRequest::new(
            method,
            self.api_url.endpoint(response_type.path_segment(), path),
        );
        request.form = form;
        self.auth.apply(&mut request).await?;

        tracing::debug!(%method, url = %request.url, %response_type, "dispatching request");
        let response = self.executor.execute(request).await?;

        ApiResponse::decode(response_type, response.body)
    }

    /// Waits for a running login and performs the lazy one if none happened yet.
    async fn ensure_authenticated(&self) -> ProxmoxResult<()> {
        match self.auth.state().await {
            AuthState::Authenticating => {}
            AuthState::Unauthenticated if self.lazy_login => {}
            _ => return Ok(()),
        }

        let Some(_gate) = self.auth.lock_login().await else {
            return Ok(());
        };
        // Another request may have logged in while this one waited.
        if self.lazy_login && self.auth.state().await == AuthState::Unauthenticated {
            self.run_login().await?;
        }
        Ok(())
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &self.credentials)
            .field("api_url", &self.api_url)
            .field("auth", &self.auth)
            .field("response_type", &self.response_type)
            .field("lazy_login", &self.lazy_login)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn non_zero(value: u32, field: &str) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: format!("rate_limit.{}", field),
        message: "Must be greater than 0".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CredentialResolver,
        core::{
            domain::model::client_config::RateLimitConfig,
            infrastructure::http_executor::{HttpResponse, MockHttpExecutor, TransportError},
        },
    };
    use serde_json::json;

    const NODES: &str = r#"{"data":[{"disk":940244992,"cpu":0.000998615325210486,"maxdisk":5284429824,"maxmem":1038385152,"node":"office","maxcpu":1,"level":"","uptime":3296027,"id":"node/office","type":"node","mem":311635968}]}"#;

    fn password_credentials() -> Credentials {
        CredentialResolver::resolve(&json!({
            "hostname": "pve.example.com",
            "username": "root",
            "password": "hunter2",
        }))
        .unwrap()
    }

    fn token_credentials() -> Credentials {
        CredentialResolver::resolve(&json!({
            "hostname": "pve.example.com",
            "token-id": "root@pam!ci",
            "token-secret": "s3cr3t",
        }))
        .unwrap()
    }

    fn body(text: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            body: text.as_bytes().to_vec(),
        })
    }

    fn login_body() -> Result<HttpResponse, TransportError> {
        body(r#"{"data":{"ticket":"PVE:root@pam:4EEC61E2::sig","CSRFPreventionToken":"4EEC61E2:abc123","username":"root@pam"}}"#)
    }

    fn new_client(
        credentials: Credentials,
        config: ClientConfig,
        executor: MockHttpExecutor,
    ) -> ApiClient {
        ApiClient::new(credentials, &config, Arc::new(executor)).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_params_never_reach_the_network() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().never();
        let client = new_client(token_credentials(), ClientConfig::default(), executor);
        let bad = json!("wrong params here");

        let results = [
            client.get("/someResource", Some(&bad)).await,
            client.create("/someResource", Some(&bad)).await,
            client.set("/someResource", Some(&bad)).await,
            client.delete("/someResource", Some(&bad)).await,
        ];
        for result in results {
            assert!(matches!(result, Err(ProxmoxError::InvalidArgument(_))));
        }
    }

    #[tokio::test]
    async fn test_relative_path_rejected() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().never();
        let client = new_client(token_credentials(), ClientConfig::default(), executor);

        let result = client.get("nodes", None).await;
        assert!(matches!(result, Err(ProxmoxError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_token_get_resource() {
        let mut executor = MockHttpExecutor::new();
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.method == HttpMethod::Get
                    && request.url == "https://pve.example.com:8006/api2/json/nodes"
                    && request.header("Authorization") == Some("PVEAPIToken=root@pam!ci=s3cr3t")
                    && request.header("Cookie").is_none()
            })
            .times(1)
            .returning(|_| body(NODES));

        let client = new_client(token_credentials(), ClientConfig::default(), executor);
        let response = client.get("/nodes", None).await.unwrap();
        let expected: Value = serde_json::from_str(NODES).unwrap();
        assert_eq!(response, ApiResponse::Array(expected));
    }

    #[tokio::test]
    async fn test_params_are_encoded() {
        let mut executor = MockHttpExecutor::new();
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.method == HttpMethod::Post
                    && request.url == "https://pve.example.com:8006/api2/json/nodes/pve1/qemu"
                    && request.form
                        == vec![
                            ("start".to_string(), "1".to_string()),
                            ("vmid".to_string(), "100".to_string()),
                        ]
            })
            .times(1)
            .returning(|_| body(r#"{"data":"UPID:pve1:000A:qmcreate:100:root@pam:"}"#));

        let client = new_client(token_credentials(), ClientConfig::default(), executor);
        let params = json!({"vmid": 100, "start": true});
        let response = client
            .create("/nodes/pve1/qemu", Some(&params))
            .await
            .unwrap();
        assert_eq!(
            response.data(),
            Some(&json!("UPID:pve1:000A:qmcreate:100:root@pam:"))
        );
    }

    #[tokio::test]
    async fn test_response_type_changes_url_and_decoding() {
        let mut executor = MockHttpExecutor::new();
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.url == "https://pve.example.com:8006/api2/extjs/version"
            })
            .times(1)
            .returning(|_| body(r#"{"success":1,"data":{"version":"8.2"}}"#));
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.url == "https://pve.example.com:8006/api2/json/version"
            })
            .times(1)
            .returning(|_| body(r#"{"data":{"version":"8.2"}}"#));

        let mut client = new_client(token_credentials(), ClientConfig::default(), executor);

        client.set_response_type(ResponseType::Extjs);
        let extjs = client.get("/version", None).await.unwrap();
        assert_eq!(
            extjs,
            ApiResponse::Text(r#"{"success":1,"data":{"version":"8.2"}}"#.to_string())
        );

        client.set_response_type(ResponseType::Json);
        let json = client.get("/version", None).await.unwrap();
        assert_eq!(json, ApiResponse::Json(r#"{"data":{"version":"8.2"}}"#.to_string()));
    }

    #[tokio::test]
    async fn test_ticket_session_attaches_cookie_and_csrf() {
        let mut executor = MockHttpExecutor::new();
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| request.url.ends_with("/access/ticket"))
            .times(1)
            .returning(|_| login_body());
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.method == HttpMethod::Put
                    && request.header("Cookie")
                        == Some("PVEAuthCookie=PVE:root@pam:4EEC61E2::sig")
                    && request.header("CSRFPreventionToken") == Some("4EEC61E2:abc123")
                    && request.header("Authorization").is_none()
            })
            .times(1)
            .returning(|_| body(r#"{"data":null}"#));

        let client = new_client(password_credentials(), ClientConfig::default(), executor);
        assert_eq!(client.auth_state().await, AuthState::Unauthenticated);

        client.login().await.unwrap();
        assert_eq!(client.auth_state().await, AuthState::Authenticated);

        let params = json!({"cores": 4});
        client
            .set("/nodes/pve1/qemu/100/config", Some(&params))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_login_does_not_retry_or_switch_to_token() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 401,
                body: "authentication failure".to_string(),
            })
        });

        let client = new_client(password_credentials(), ClientConfig::default(), executor);
        let result = client.login().await;
        assert!(matches!(
            result,
            Err(ProxmoxError::Transport(TransportError::Status { status: 401, .. }))
        ));
        assert_eq!(client.auth_state().await, AuthState::Failed);

        // A failed session refuses requests without touching the network.
        let result = client.get("/nodes", None).await;
        assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_lazy_login_happens_on_first_request() {
        let mut executor = MockHttpExecutor::new();
        let mut sequence = mockall::Sequence::new();
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| request.url.ends_with("/json/access/ticket"))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| login_body());
        executor
            .expect_execute()
            .withf(|request: &HttpRequest| request.url.ends_with("/json/nodes"))
            .times(2)
            .in_sequence(&mut sequence)
            .returning(|_| body(NODES));

        let config = ClientConfig {
            lazy_login: true,
            ..Default::default()
        };
        let client = new_client(password_credentials(), config, executor);
        client.get("/nodes", None).await.unwrap();
        client.get("/nodes", None).await.unwrap();
        assert_eq!(client.auth_token().await.unwrap().username(), "root@pam");
    }

    #[tokio::test]
    async fn test_without_login_ticket_session_refuses_requests() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().never();
        let client = new_client(password_credentials(), ClientConfig::default(), executor);

        let result = client.delete("/nodes/pve1/qemu/100", None).await;
        assert!(matches!(result, Err(ProxmoxError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_api_token_login_is_noop() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().never();
        let client = new_client(token_credentials(), ClientConfig::default(), executor);

        client.login().await.unwrap();
        assert_eq!(client.auth_state().await, AuthState::ApiToken);
        assert!(client.auth_token().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 500,
                body: "internal error".to_string(),
            })
        });

        let client = new_client(token_credentials(), ClientConfig::default(), executor);
        let result = client.get("/nodes", None).await;
        match result {
            Err(ProxmoxError::Transport(TransportError::Status { status, body })) => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_insecure_scheme() {
        let config = ClientConfig {
            secure: false,
            ..Default::default()
        };
        let client = new_client(token_credentials(), config, MockHttpExecutor::new());
        assert_eq!(client.api_url().as_str(), "http://pve.example.com:8006/api2");
    }

    #[test]
    fn test_invalid_rate_limit_rejected() {
        for (requests_per_second, burst_size, field) in [
            (0, 1, "rate_limit.requests_per_second"),
            (1, 0, "rate_limit.burst_size"),
        ] {
            let config = ClientConfig {
                rate_limit: Some(RateLimitConfig {
                    requests_per_second,
                    burst_size,
                }),
                ..Default::default()
            };
            let result = ApiClient::new(
                token_credentials(),
                &config,
                Arc::new(MockHttpExecutor::new()),
            );
            match result {
                Err(ProxmoxError::Validation(ValidationError::Field { field: name, .. })) => {
                    assert_eq!(name, field)
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_rate_limiting_delays_requests() {
        use std::time::{Duration, Instant};

        let mut executor = MockHttpExecutor::new();
        executor.expect_execute().times(4).returning(|_| body(NODES));

        let config = ClientConfig {
            rate_limit: Some(RateLimitConfig {
                requests_per_second: 2,
                burst_size: 2,
            }),
            ..Default::default()
        };
        let client = new_client(token_credentials(), config, executor);

        // The burst passes straight through.
        let start = Instant::now();
        client.get("/nodes", None).await.unwrap();
        client.get("/nodes", None).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));

        // The next two wait for replenishment at 2/sec.
        let start = Instant::now();
        client.get("/nodes", None).await.unwrap();
        client.get("/nodes", None).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(900));
    }
}

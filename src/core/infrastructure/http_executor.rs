//! The HTTP transport seam. Everything above this module builds requests and
//! interprets responses; everything below it is `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// The four verbs the Proxmox API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// A pure read never needs the CSRF prevention token.
    pub fn is_read(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully prepared request: the URL already carries the API path and the
/// headers already carry the authentication material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Sent as the query string for GET, as a urlencoded body otherwise.
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failures produced by the transport. These reach the caller unmodified.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS failure, timeout...
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
        }
    }
}

/// Executes one HTTP round trip.
///
/// Implementations own connection pooling, TLS and timeouts. They must not
/// retry, and must turn every non-2xx status into [`TransportError::Status`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default executor backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    http_client: Client,
}

impl ReqwestExecutor {
    /// Builds the underlying client.
    ///
    /// # Errors
    /// Returns `reqwest::Error` if the TLS backend cannot be initialised.
    pub fn new(accept_invalid_certs: bool, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
        })
    }

    /// Wraps an already configured client.
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            form,
        } = request;

        let mut req_builder = self.http_client.request(method.into(), &url);
        for (name, value) in &headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }
        if !form.is_empty() {
            req_builder = if method.is_read() {
                req_builder.query(&form)
            } else {
                req_builder.form(&form)
            };
        }

        let response = req_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(HttpResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string, header, method, path, query_param},
    };

    fn executor() -> ReqwestExecutor {
        ReqwestExecutor::new(false, Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn test_only_get_is_read() {
        assert!(HttpMethod::Get.is_read());
        assert!(!HttpMethod::Post.is_read());
        assert!(!HttpMethod::Put.is_read());
        assert!(!HttpMethod::Delete.is_read());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut request = HttpRequest::new(HttpMethod::Get, "http://localhost/");
        request
            .headers
            .push(("Authorization".to_string(), "token".to_string()));
        assert_eq!(request.header("authorization"), Some("token"));
        assert_eq!(request.header("Cookie"), None);
    }

    #[tokio::test]
    async fn test_get_sends_form_as_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes"))
            .and(query_param("type", "vm"))
            .and(header("Authorization", "PVEAPIToken=a=b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":[]}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = HttpRequest::new(
            HttpMethod::Get,
            format!("{}/api2/json/nodes", mock_server.uri()),
        );
        request
            .headers
            .push(("Authorization".to_string(), "PVEAPIToken=a=b".to_string()));
        request.form.push(("type".to_string(), "vm".to_string()));

        let response = executor().execute(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{\"data\":[]}".to_vec());
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .and(body_string("username=root&realm=pam"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = HttpRequest::new(
            HttpMethod::Post,
            format!("{}/api2/json/access/ticket", mock_server.uri()),
        );
        request.form.push(("username".to_string(), "root".to_string()));
        request.form.push(("realm".to_string(), "pam".to_string()));

        assert!(executor().execute(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api2/json/nodes/pve1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Permission check failed"))
            .mount(&mock_server)
            .await;

        let request = HttpRequest::new(
            HttpMethod::Delete,
            format!("{}/api2/json/nodes/pve1", mock_server.uri()),
        );
        let error = executor().execute(request).await.unwrap_err();
        assert_eq!(error.status(), Some(403));
        assert!(matches!(
            error,
            TransportError::Status { ref body, .. } if body == "Permission check failed"
        ));
    }

    #[tokio::test]
    async fn test_preconfigured_client_is_used() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/version"))
            .and(header("User-Agent", "pve-inventory/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":{}}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let http_client = Client::builder()
            .user_agent("pve-inventory/1.0")
            .build()
            .unwrap();
        let request = HttpRequest::new(
            HttpMethod::Get,
            format!("{}/api2/json/version", mock_server.uri()),
        );
        let response = ReqwestExecutor::with_client(http_client)
            .execute(request)
            .await
            .unwrap();
        assert_eq!(response.body, b"{\"data\":{}}".to_vec());
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        // Nothing listens on port 9 on the loopback interface.
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/api2/json/version");
        let error = executor().execute(request).await.unwrap_err();
        assert!(matches!(error, TransportError::Request(_)));
        assert_eq!(error.status(), None);
    }
}

pub mod api_response;
pub mod auth_token;
pub mod client_config;
pub mod credentials;
pub mod response_type;

pub mod api_client;
pub mod http_executor;
pub mod params;

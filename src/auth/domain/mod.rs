pub mod auth_method;

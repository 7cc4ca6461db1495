pub mod api_client;
pub mod auth_provider;
pub mod config;

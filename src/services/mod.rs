pub mod api;
pub mod http_client;
pub mod loader;

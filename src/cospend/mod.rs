pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod login;
pub mod types;

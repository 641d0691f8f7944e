pub mod api_client;
pub mod models;
pub mod token_store;

pub use api_client::ApiClient;

pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod infrastructure;
pub mod notify;
pub mod render;

use std::sync::Arc;

pub use application::{CartPage, CheckoutPage};
pub use config::Config;
pub use errors::CheckoutError;
pub use infrastructure::ApiClient;

use domain::ports::TokenSource;
use infrastructure::token_store::{FileTokenStore, StaticToken};

/// Build the backend client described by `config`.
///
/// A token given directly wins over a token file; with neither, requests go
/// out unauthenticated.
pub fn build_client(config: &Config) -> Result<ApiClient, CheckoutError> {
    let tokens: Arc<dyn TokenSource> = match (&config.token, &config.token_file) {
        (Some(token), _) => Arc::new(StaticToken::new(Some(token.clone()))),
        (None, Some(path)) => Arc::new(FileTokenStore::new(path)),
        (None, None) => Arc::new(StaticToken::anonymous()),
    };
    ApiClient::new(&config.api_base_url, config.timeout, tokens)
}

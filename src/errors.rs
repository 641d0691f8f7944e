use thiserror::Error;

use crate::domain::errors::ValidationError;
use crate::notify::{Toast, ToastLevel};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Could not reach the server: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response from the server: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CheckoutError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CheckoutError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Local precondition failures are warnings; anything the server or
    /// the network did wrong is an error.
    pub fn toast(&self) -> Toast {
        let level = match self {
            CheckoutError::Validation(_) => ToastLevel::Warning,
            _ => ToastLevel::Error,
        };
        Toast::new(level, self.to_string())
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CheckoutError::Decode(e.to_string())
        } else if e.is_timeout() {
            CheckoutError::Network("request timed out".to_string())
        } else {
            CheckoutError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(e: serde_json::Error) -> Self {
        CheckoutError::Decode(e.to_string())
    }
}

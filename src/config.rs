use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::checkout::ShippingPolicy;
use crate::infrastructure::api_client::DEFAULT_TIMEOUT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub shipping: ShippingPolicy,
}

impl Config {
    /// Reads configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = match get("API_TIMEOUT_SECS") {
            Some(raw) => match parse::<u64>("API_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: "API_TIMEOUT_SECS",
                        value: raw,
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => DEFAULT_TIMEOUT,
        };
        let mut shipping = ShippingPolicy::default();
        if let Some(raw) = get("SHIPPING_FEE") {
            shipping.flat_fee = parse_amount("SHIPPING_FEE", &raw)?;
        }
        if let Some(raw) = get("FREE_SHIPPING_THRESHOLD") {
            shipping.free_threshold = Some(parse_amount("FREE_SHIPPING_THRESHOLD", &raw)?);
        }

        Ok(Self {
            api_base_url: get("API_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            timeout,
            token: get("API_TOKEN"),
            token_file: get("TOKEN_FILE").map(PathBuf::from),
            shipping,
        })
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_amount(key: &'static str, raw: &str) -> Result<BigDecimal, ConfigError> {
    let amount: BigDecimal = parse(key, raw)?;
    if amount < BigDecimal::from(0) {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        });
    }
    Ok(amount)
}

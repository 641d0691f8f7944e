use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::cart::{CartLineItem, Quantity};
use crate::domain::checkout::{OrderRequest, UserProfile};
use crate::domain::ports::{CartApi, CartSnapshot, LineItemUpdate, TokenSource};
use crate::errors::CheckoutError;

use super::models::{
    AddCartProductBody, ApplyDiscountBody, ApplyDiscountResponse, CartDto, CartProductDto,
    OrderRequestBody, PlaceOrderResponse, UpdateCartProductBody, UserInfoDto,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ── Client ───────────────────────────────────────────────────────────────────

/// JSON-over-HTTP gateway to the storefront backend. One attempt per call;
/// the caller decides what to do with a failure.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, CheckoutError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.tokens.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => log::warn!("Ignoring unusable auth token: {}", e),
            }
        }
        headers
    }

    /// Sends one request and returns the response body as JSON.
    ///
    /// An empty 2xx body comes back as `Value::Null`. A `{code, result}`
    /// envelope is unwrapped to its `result`.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, CheckoutError> {
        let url = format!("{}{}", self.base_url, endpoint);
        log::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(self.auth_headers());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, url, e);
            CheckoutError::from(e)
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &text);
            log::warn!("{} {} -> {}: {}", method, url, status.as_u16(), message);
            return Err(CheckoutError::Http {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&text)?;
        Ok(unwrap_envelope(value))
    }

    async fn call_as<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<R, CheckoutError> {
        let value = self.call(method, endpoint, body).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Human-readable message for a failed response: the body's `message` or
/// `error` field when there is one, otherwise the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error"].iter().find_map(|key| {
            v.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
    });
    from_body.unwrap_or_else(|| match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    })
}

fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("code") && map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ── Backend port ─────────────────────────────────────────────────────────────

impl CartApi for ApiClient {
    async fn current_cart(&self) -> Result<CartSnapshot, CheckoutError> {
        let dto: CartDto = self
            .call_as(Method::GET, "/cart/api/current", None::<&()>)
            .await?;
        Ok(dto.into())
    }

    async fn selected_products(&self, cart_id: &str) -> Result<Vec<CartLineItem>, CheckoutError> {
        let dtos: Vec<CartProductDto> = self
            .call_as(
                Method::GET,
                &format!("/CartProduct/{cart_id}/selected-products"),
                None::<&()>,
            )
            .await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn update_cart_product(
        &self,
        cart_id: &str,
        cart_product_id: &str,
        quantity: Quantity,
        choose: Option<bool>,
    ) -> Result<LineItemUpdate, CheckoutError> {
        let body = UpdateCartProductBody {
            quantity: quantity.get(),
            choose,
        };
        let dto: CartProductDto = self
            .call_as(
                Method::PUT,
                &format!("/CartProduct/{cart_id}/{cart_product_id}"),
                Some(&body),
            )
            .await?;
        Ok(dto.into())
    }

    async fn add_product(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: Quantity,
    ) -> Result<(), CheckoutError> {
        let body = AddCartProductBody {
            product_id,
            quantity: quantity.get(),
        };
        self.call(Method::POST, &format!("/CartProduct/{cart_id}"), Some(&body))
            .await?;
        Ok(())
    }

    async fn remove_cart_product(
        &self,
        cart_id: &str,
        cart_product_id: &str,
    ) -> Result<(), CheckoutError> {
        self.call(
            Method::DELETE,
            &format!("/CartProduct/{cart_id}/{cart_product_id}"),
            None::<&()>,
        )
        .await?;
        Ok(())
    }

    async fn apply_discount(
        &self,
        code: &str,
        order_total: &BigDecimal,
    ) -> Result<BigDecimal, CheckoutError> {
        let body = ApplyDiscountBody {
            discount_code: code,
            order_total: order_total.clone(),
        };
        let response: ApplyDiscountResponse = self
            .call_as(Method::POST, "/discounts/apply", Some(&body))
            .await?;
        Ok(response.discount_amount)
    }

    async fn place_order(
        &self,
        cart_id: &str,
        request: &OrderRequest,
    ) -> Result<String, CheckoutError> {
        let body = OrderRequestBody::from(request);
        let response: PlaceOrderResponse = self
            .call_as(Method::POST, &format!("/order/{cart_id}"), Some(&body))
            .await?;
        Ok(response.id_order)
    }

    async fn my_info(&self) -> Result<UserProfile, CheckoutError> {
        let dto: UserInfoDto = self
            .call_as(Method::GET, "/users/myInfo", None::<&()>)
            .await?;
        Ok(dto.into())
    }
}

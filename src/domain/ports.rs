use bigdecimal::BigDecimal;

use super::cart::{CartLineItem, Quantity};
use super::checkout::{OrderRequest, UserProfile};
use crate::errors::CheckoutError;

/// A cart as the backend reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub cart_id: String,
    pub items: Vec<CartLineItem>,
}

/// The backend's answer to a line-item update.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemUpdate {
    pub quantity: Quantity,
    pub total_price: BigDecimal,
    pub selected: Option<bool>,
}

/// Storefront backend, as seen by the cart and checkout pages.
#[allow(async_fn_in_trait)]
pub trait CartApi {
    async fn current_cart(&self) -> Result<CartSnapshot, CheckoutError>;

    async fn selected_products(&self, cart_id: &str) -> Result<Vec<CartLineItem>, CheckoutError>;

    async fn update_cart_product(
        &self,
        cart_id: &str,
        cart_product_id: &str,
        quantity: Quantity,
        choose: Option<bool>,
    ) -> Result<LineItemUpdate, CheckoutError>;

    async fn add_product(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: Quantity,
    ) -> Result<(), CheckoutError>;

    async fn remove_cart_product(
        &self,
        cart_id: &str,
        cart_product_id: &str,
    ) -> Result<(), CheckoutError>;

    async fn apply_discount(
        &self,
        code: &str,
        order_total: &BigDecimal,
    ) -> Result<BigDecimal, CheckoutError>;

    async fn place_order(
        &self,
        cart_id: &str,
        request: &OrderRequest,
    ) -> Result<String, CheckoutError>;

    async fn my_info(&self) -> Result<UserProfile, CheckoutError>;
}

/// Read-only view of the persisted bearer token.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

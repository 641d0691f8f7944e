use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::cart::CartViewState;
use crate::domain::checkout::{
    CheckoutState, OrderConfirmation, PaymentMethod, PromoState, ShippingPolicy,
};
use crate::domain::errors::ValidationError;
use crate::domain::ports::CartApi;
use crate::errors::CheckoutError;
use crate::format::format_currency;
use crate::notify::{Notifier, Toast};
use crate::render::{render_checkout, CheckoutView};

use super::{confirm_quantity, report};

/// The checkout page. Unlike the cart page, the server decides which items
/// are part of the order, so selection changes are persisted.
pub struct CheckoutPage<A, N> {
    api: A,
    notifier: N,
    state: CheckoutState,
}

impl<A: CartApi, N: Notifier> CheckoutPage<A, N> {
    pub async fn load(api: A, notifier: N, cart_id: &str, shipping: ShippingPolicy) -> Self {
        let cart = match api.selected_products(cart_id).await {
            Ok(items) => CartViewState::from_server(cart_id, items),
            Err(e) => {
                log::warn!("Could not load checkout items for cart {}: {}", cart_id, e);
                notifier.notify(e.toast());
                CartViewState::empty(cart_id)
            }
        };
        let mut state = CheckoutState::new(cart, shipping);

        match api.my_info().await {
            Ok(profile) => state.set_addresses(profile.addresses),
            Err(e) => {
                log::warn!("Could not load shipping addresses: {}", e);
                notifier.notify(Toast::warning(format!(
                    "Could not load your addresses: {e}"
                )));
            }
        }

        Self {
            api,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn render(&self) -> CheckoutView {
        render_checkout(&self.state)
    }

    pub fn select_address(&mut self, address_id: &str) -> Result<(), CheckoutError> {
        let result = self
            .state
            .select_address(address_id)
            .map_err(CheckoutError::from);
        report(&self.notifier, result)
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.state.payment_method = Some(method);
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.state.note = note.into();
    }

    pub async fn set_quantity(
        &mut self,
        cart_product_id: &str,
        requested: i64,
    ) -> Result<bool, CheckoutError> {
        let result = confirm_quantity(
            &self.api,
            &mut self.state.cart,
            cart_product_id,
            requested,
        )
        .await;
        report(&self.notifier, result)
    }

    /// Persists the choice first. A deselected item leaves the checkout
    /// list once the server has accepted it.
    pub async fn set_item_selected(
        &mut self,
        cart_product_id: &str,
        selected: bool,
    ) -> Result<(), CheckoutError> {
        let ticket = report(
            &self.notifier,
            self.state
                .cart
                .begin_update(cart_product_id)
                .map_err(CheckoutError::from),
        )?;
        let quantity = self.state.cart.item(cart_product_id)?.quantity;
        let cart_id = self.state.cart.cart_id().to_string();
        let update = report(
            &self.notifier,
            self.api
                .update_cart_product(&cart_id, cart_product_id, quantity, Some(selected))
                .await,
        )?;

        if update.selected.unwrap_or(selected) {
            self.state.cart.set_selected(cart_product_id, true)?;
            self.state
                .cart
                .apply_update(&ticket, update.quantity, update.total_price);
        } else {
            self.state.cart.remove(cart_product_id)?;
        }
        Ok(())
    }

    /// Asks the backend to validate `code` against the current subtotal.
    /// On rejection the previous discount stays and the input unlocks. An
    /// applied code keeps the input locked until `clear_promo_code`.
    pub async fn apply_promo_code(&mut self, code: &str) -> Result<BigDecimal, CheckoutError> {
        if let (false, Some(applied)) =
            (self.state.promo.input_enabled, &self.state.promo.applied_code)
        {
            let applied = applied.clone();
            return report(
                &self.notifier,
                Err(ValidationError::PromoAlreadyApplied(applied).into()),
            );
        }
        let code = code.trim();
        if code.is_empty() {
            return report(
                &self.notifier,
                Err(ValidationError::EmptyPromoCode.into()),
            );
        }

        self.state.promo.input_enabled = false;
        let order_total = self.state.cart.subtotal();
        match self.api.apply_discount(code, &order_total).await {
            Ok(discount) => {
                self.state.promo.applied_code = Some(code.to_string());
                self.state.promo.discount = discount.clone();
                self.notifier.notify(Toast::success(format!(
                    "Promo code {} applied: -{}",
                    code,
                    format_currency(&discount)
                )));
                Ok(discount)
            }
            Err(e) => {
                self.state.promo.input_enabled = true;
                report(&self.notifier, Err(e))
            }
        }
    }

    pub fn clear_promo_code(&mut self) {
        self.state.promo = PromoState::default();
    }

    /// Validates locally, then submits. Once an order is placed the page
    /// keeps returning the same confirmation without sending anything.
    pub async fn place_order(&mut self) -> Result<OrderConfirmation, CheckoutError> {
        if let Some(confirmation) = &self.state.confirmation {
            return Ok(confirmation.clone());
        }

        let request = report(
            &self.notifier,
            self.state
                .build_order_request()
                .map_err(CheckoutError::from),
        )?;
        let cart_id = self.state.cart.cart_id().to_string();
        let order_id = report(
            &self.notifier,
            self.api.place_order(&cart_id, &request).await,
        )?;

        log::info!("Placed order {} for cart {}", order_id, cart_id);
        let confirmation = OrderConfirmation {
            order_id,
            placed_at: Utc::now(),
        };
        self.state.cart = CartViewState::empty(cart_id);
        self.state.promo = PromoState::default();
        self.state.confirmation = Some(confirmation.clone());
        self.notifier.notify(Toast::success(format!(
            "Order #{} placed successfully",
            confirmation.order_id
        )));
        Ok(confirmation)
    }
}

use crate::domain::cart::{CartViewState, Quantity};
use crate::domain::errors::ValidationError;
use crate::domain::ports::CartApi;
use crate::errors::CheckoutError;
use crate::notify::{Notifier, Toast};
use crate::render::{render_cart, CartView};

use super::{confirm_quantity, report};

/// The cart page: every line in the user's cart, with local-only
/// selection and server-confirmed quantities.
pub struct CartPage<A, N> {
    api: A,
    notifier: N,
    state: CartViewState,
}

impl<A: CartApi, N: Notifier> CartPage<A, N> {
    /// Loads the current cart. A failed load shows the empty cart instead
    /// of failing the page.
    pub async fn load(api: A, notifier: N) -> Self {
        let state = match api.current_cart().await {
            Ok(snapshot) => CartViewState::from_server(snapshot.cart_id, snapshot.items),
            Err(e) => {
                log::warn!("Could not load cart: {}", e);
                notifier.notify(e.toast());
                CartViewState::default()
            }
        };
        Self {
            api,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> &CartViewState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn render(&self) -> CartView {
        render_cart(&self.state)
    }

    /// Fresh load from the server; the only way back out of the empty view.
    pub async fn reload(&mut self) -> Result<(), CheckoutError> {
        let snapshot = report(&self.notifier, self.api.current_cart().await)?;
        self.state = CartViewState::from_server(snapshot.cart_id, snapshot.items);
        Ok(())
    }

    /// Out-of-range requests are clamped, not rejected. Returns whether the
    /// server's answer was applied (it is dropped if superseded).
    pub async fn set_quantity(
        &mut self,
        cart_product_id: &str,
        requested: i64,
    ) -> Result<bool, CheckoutError> {
        let result = confirm_quantity(&self.api, &mut self.state, cart_product_id, requested).await;
        report(&self.notifier, result)
    }

    pub async fn set_quantity_input(
        &mut self,
        cart_product_id: &str,
        input: &str,
    ) -> Result<bool, CheckoutError> {
        let quantity = Quantity::parse_input(input);
        self.set_quantity(cart_product_id, quantity.get() as i64)
            .await
    }

    pub async fn increment(&mut self, cart_product_id: &str) -> Result<bool, CheckoutError> {
        let current = report(&self.notifier, self.current_quantity(cart_product_id))?;
        self.set_quantity(cart_product_id, current.increment().get() as i64)
            .await
    }

    pub async fn decrement(&mut self, cart_product_id: &str) -> Result<bool, CheckoutError> {
        let current = report(&self.notifier, self.current_quantity(cart_product_id))?;
        self.set_quantity(cart_product_id, current.decrement().get() as i64)
            .await
    }

    fn current_quantity(&self, cart_product_id: &str) -> Result<Quantity, CheckoutError> {
        Ok(self.state.item(cart_product_id)?.quantity)
    }

    /// Selection on the cart page is UI state only; no request is sent.
    pub fn toggle_selected(
        &mut self,
        cart_product_id: &str,
        selected: bool,
    ) -> Result<(), CheckoutError> {
        let result = self
            .state
            .set_selected(cart_product_id, selected)
            .map_err(CheckoutError::from);
        report(&self.notifier, result)
    }

    pub async fn remove_item(&mut self, cart_product_id: &str) -> Result<(), CheckoutError> {
        report(
            &self.notifier,
            self.state.item(cart_product_id).map_err(CheckoutError::from),
        )?;
        let cart_id = self.state.cart_id().to_string();
        report(
            &self.notifier,
            self.api.remove_cart_product(&cart_id, cart_product_id).await,
        )?;
        let removed = report(
            &self.notifier,
            self.state.remove(cart_product_id).map_err(CheckoutError::from),
        )?;
        self.notifier
            .notify(Toast::info(format!("Removed {} from the cart", removed.product_name)));
        Ok(())
    }

    /// Adds a product and reloads the cart so the new line shows exactly as
    /// the server stored it.
    pub async fn add_product(
        &mut self,
        product_id: &str,
        requested: i64,
    ) -> Result<(), CheckoutError> {
        let quantity = Quantity::clamped(requested);
        if self.state.cart_id().is_empty() {
            self.reload().await?;
        }
        let cart_id = self.state.cart_id().to_string();
        if cart_id.is_empty() {
            return report(&self.notifier, Err(ValidationError::CartNotLoaded.into()));
        }
        report(
            &self.notifier,
            self.api.add_product(&cart_id, product_id, quantity).await,
        )?;
        self.reload().await?;
        self.notifier.notify(Toast::success("Added to cart"));
        Ok(())
    }
}

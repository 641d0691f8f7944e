pub mod cart_page;
pub mod checkout_page;

pub use cart_page::CartPage;
pub use checkout_page::CheckoutPage;

use crate::domain::cart::{CartViewState, Quantity};
use crate::domain::ports::CartApi;
use crate::errors::CheckoutError;
use crate::notify::Notifier;

/// Sends a quantity change and writes the server's totals back if no newer
/// change for the same item was issued meanwhile. Nothing is written on
/// failure.
pub(crate) async fn confirm_quantity<A: CartApi>(
    api: &A,
    state: &mut CartViewState,
    cart_product_id: &str,
    requested: i64,
) -> Result<bool, CheckoutError> {
    let quantity = Quantity::clamped(requested);
    let ticket = state.begin_update(cart_product_id)?;
    let cart_id = state.cart_id().to_string();
    let update = api
        .update_cart_product(&cart_id, cart_product_id, quantity, None)
        .await?;
    Ok(state.apply_update(&ticket, update.quantity, update.total_price))
}

/// Toasts a failure before handing it back.
pub(crate) fn report<T, N: Notifier>(
    notifier: &N,
    result: Result<T, CheckoutError>,
) -> Result<T, CheckoutError> {
    if let Err(e) = &result {
        notifier.notify(e.toast());
    }
    result
}

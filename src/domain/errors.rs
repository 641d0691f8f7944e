use thiserror::Error;

/// Preconditions checked locally, before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a shipping address")]
    MissingShippingAddress,
    #[error("Please select a payment method")]
    MissingPaymentMethod,
    #[error("Please select at least one product to check out")]
    NoItemsSelected,
    #[error("Please enter a promo code")]
    EmptyPromoCode,
    #[error("Promo code {0} is already applied; remove it to use another")]
    PromoAlreadyApplied(String),
    #[error("The cart has not been loaded yet")]
    CartNotLoaded,
    #[error("Product {0} is no longer in the cart")]
    UnknownItem(String),
    #[error("Shipping address {0} does not exist")]
    UnknownAddress(String),
}

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cart::{CartLineItem, CartViewState};
use super::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
}

/// Totals for the selected items. Pure: the same inputs always give the
/// same summary. The discount is capped so the total never drops below zero.
pub fn compute_summary(
    items: &[CartLineItem],
    shipping_fee: &BigDecimal,
    discount: &BigDecimal,
) -> CheckoutSummary {
    let zero = BigDecimal::from(0);
    let subtotal = items
        .iter()
        .filter(|i| i.selected)
        .fold(zero.clone(), |acc, i| acc + &i.total_price);
    let shipping_fee = if *shipping_fee < zero {
        zero.clone()
    } else {
        shipping_fee.clone()
    };
    let gross = &subtotal + &shipping_fee;
    let discount = if *discount < zero {
        zero
    } else if *discount > gross {
        gross.clone()
    } else {
        discount.clone()
    };
    let total = &gross - &discount;
    CheckoutSummary {
        subtotal,
        shipping_fee,
        discount,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: BigDecimal,
    pub free_threshold: Option<BigDecimal>,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee: BigDecimal::from(30000),
            free_threshold: None,
        }
    }
}

impl ShippingPolicy {
    /// Nothing is charged until there is somewhere to ship something to.
    pub fn fee_for(
        &self,
        subtotal: &BigDecimal,
        address_selected: bool,
        any_selected: bool,
    ) -> BigDecimal {
        if !address_selected || !any_selected {
            return BigDecimal::from(0);
        }
        match &self.free_threshold {
            Some(threshold) if subtotal >= threshold => BigDecimal::from(0),
            _ => self.flat_fee.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "BANK_TRANSFER")]
    BankTransfer,
    #[serde(rename = "E_WALLET")]
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::EWallet => "E_WALLET",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on delivery",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::EWallet => "E-wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COD" => Ok(PaymentMethod::Cod),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "E_WALLET" => Ok(PaymentMethod::EWallet),
            other => Err(format!("unknown payment method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub id: String,
    pub recipient: String,
    pub phone: String,
    pub address: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub addresses: Vec<ShippingAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub shipping_address_id: String,
    pub payment_method: PaymentMethod,
    pub note: String,
    pub discount_code: Option<String>,
    pub shipping_fee: BigDecimal,
    pub discount: BigDecimal,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub placed_at: DateTime<Utc>,
}

/// Promo-code box: the applied code and discount, and whether the input
/// currently accepts edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoState {
    pub applied_code: Option<String>,
    pub discount: BigDecimal,
    pub input_enabled: bool,
}

impl Default for PromoState {
    fn default() -> Self {
        Self {
            applied_code: None,
            discount: BigDecimal::from(0),
            input_enabled: true,
        }
    }
}

/// Everything the checkout page knows. Items are the cart products the
/// server reports as chosen for checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    pub cart: CartViewState,
    pub shipping: ShippingPolicy,
    pub addresses: Vec<ShippingAddress>,
    pub selected_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub note: String,
    pub promo: PromoState,
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutState {
    pub fn new(cart: CartViewState, shipping: ShippingPolicy) -> Self {
        Self {
            cart,
            shipping,
            ..Self::default()
        }
    }

    /// Installs the user's addresses and preselects the default one.
    pub fn set_addresses(&mut self, addresses: Vec<ShippingAddress>) {
        self.selected_address = addresses
            .iter()
            .find(|a| a.is_default)
            .map(|a| a.id.clone());
        self.addresses = addresses;
    }

    pub fn select_address(&mut self, address_id: &str) -> Result<(), ValidationError> {
        if !self.addresses.iter().any(|a| a.id == address_id) {
            return Err(ValidationError::UnknownAddress(address_id.to_string()));
        }
        self.selected_address = Some(address_id.to_string());
        Ok(())
    }

    pub fn shipping_fee(&self) -> BigDecimal {
        self.shipping.fee_for(
            &self.cart.subtotal(),
            self.selected_address.is_some(),
            self.cart.selected_count() > 0,
        )
    }

    pub fn summary(&self) -> CheckoutSummary {
        compute_summary(
            self.cart.items(),
            &self.shipping_fee(),
            &self.promo.discount,
        )
    }

    /// First unmet requirement for placing the order, in the order the
    /// user is asked to fix them.
    pub fn missing_requirement(&self) -> Option<ValidationError> {
        if self.selected_address.is_none() {
            Some(ValidationError::MissingShippingAddress)
        } else if self.payment_method.is_none() {
            Some(ValidationError::MissingPaymentMethod)
        } else if self.cart.selected_count() == 0 {
            Some(ValidationError::NoItemsSelected)
        } else {
            None
        }
    }

    pub fn build_order_request(&self) -> Result<OrderRequest, ValidationError> {
        if let Some(missing) = self.missing_requirement() {
            return Err(missing);
        }
        let (Some(address_id), Some(payment_method)) =
            (self.selected_address.clone(), self.payment_method)
        else {
            return Err(ValidationError::MissingShippingAddress);
        };
        let summary = self.summary();
        Ok(OrderRequest {
            shipping_address_id: address_id,
            payment_method,
            note: self.note.trim().to_string(),
            discount_code: self.promo.applied_code.clone(),
            shipping_fee: summary.shipping_fee,
            discount: summary.discount,
            total_amount: summary.total,
        })
    }
}

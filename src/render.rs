//! Text rendering of the cart and checkout pages.
//!
//! Views are pure functions of state: rendering the same state twice gives
//! identical output, and nothing is ever read back from a rendered view.

use std::fmt;

use crate::domain::cart::{CartLineItem, CartViewState};
use crate::domain::checkout::CheckoutState;
use crate::format::{format_currency, format_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Populated,
    Empty,
}

impl ViewState {
    fn of(items: &[CartLineItem]) -> Self {
        if items.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Populated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub cart_product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
    pub selected: bool,
}

impl From<&CartLineItem> for LineView {
    fn from(item: &CartLineItem) -> Self {
        LineView {
            cart_product_id: item.cart_product_id.clone(),
            name: item.product_name.clone(),
            quantity: item.quantity.get(),
            unit_price: format_currency(&item.unit_price),
            total_price: format_currency(&item.total_price),
            selected: item.selected,
        }
    }
}

impl fmt::Display for LineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}  x{}  {} each  {}",
            if self.selected { "x" } else { " " },
            self.name,
            self.quantity,
            self.unit_price,
            self.total_price
        )
    }
}

// ── Cart page ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub state: ViewState,
    pub lines: Vec<LineView>,
    pub selected_count: usize,
    pub subtotal: String,
    pub checkout_enabled: bool,
}

pub fn render_cart(state: &CartViewState) -> CartView {
    let view_state = ViewState::of(state.items());
    let selected_count = state.selected_count();
    CartView {
        state: view_state,
        lines: state.items().iter().map(LineView::from).collect(),
        selected_count,
        subtotal: format_currency(&state.subtotal()),
        checkout_enabled: view_state == ViewState::Populated && selected_count > 0,
    }
}

impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state == ViewState::Empty {
            writeln!(f, "Your cart is empty.")?;
            return writeln!(f, "Checkout: disabled");
        }
        writeln!(f, "Cart ({} items)", self.lines.len())?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "Subtotal ({} selected): {}", self.selected_count, self.subtotal)?;
        writeln!(
            f,
            "Checkout: {}",
            if self.checkout_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ── Checkout page ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    pub state: ViewState,
    pub lines: Vec<LineView>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
    pub subtotal: String,
    pub shipping_fee: String,
    pub discount: String,
    pub total: String,
    pub promo_code: Option<String>,
    pub promo_input_enabled: bool,
    pub place_order_enabled: bool,
    /// What still blocks the order, if anything.
    pub notice: Option<String>,
    pub confirmation: Option<String>,
}

pub fn render_checkout(state: &CheckoutState) -> CheckoutView {
    let view_state = ViewState::of(state.cart.items());
    let summary = state.summary();
    let missing = state.missing_requirement();

    let address = state.selected_address.as_ref().and_then(|id| {
        state
            .addresses
            .iter()
            .find(|a| &a.id == id)
            .map(|a| format!("{} ({}), {}", a.recipient, a.phone, a.address))
    });

    CheckoutView {
        state: view_state,
        lines: state.cart.items().iter().map(LineView::from).collect(),
        address,
        payment_method: state.payment_method.map(|m| m.label().to_string()),
        subtotal: format_currency(&summary.subtotal),
        shipping_fee: format_currency(&summary.shipping_fee),
        discount: format_currency(&summary.discount),
        total: format_currency(&summary.total),
        promo_code: state.promo.applied_code.clone(),
        promo_input_enabled: state.promo.input_enabled && state.confirmation.is_none(),
        place_order_enabled: view_state == ViewState::Populated
            && missing.is_none()
            && state.confirmation.is_none(),
        notice: if view_state == ViewState::Populated {
            missing.map(|m| m.to_string())
        } else {
            None
        },
        confirmation: state.confirmation.as_ref().map(|c| {
            format!(
                "Order #{} placed on {}",
                c.order_id,
                format_date(&c.placed_at)
            )
        }),
    }
}

impl fmt::Display for CheckoutView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(confirmation) = &self.confirmation {
            writeln!(f, "{confirmation}")?;
        }
        if self.state == ViewState::Empty {
            writeln!(f, "No products selected for checkout.")?;
            return writeln!(f, "Place order: disabled");
        }
        writeln!(f, "Checkout ({} items)", self.lines.len())?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(
            f,
            "Ship to: {}",
            self.address.as_deref().unwrap_or("(not selected)")
        )?;
        writeln!(
            f,
            "Payment: {}",
            self.payment_method.as_deref().unwrap_or("(not selected)")
        )?;
        writeln!(f, "Subtotal: {}", self.subtotal)?;
        writeln!(f, "Shipping: {}", self.shipping_fee)?;
        match &self.promo_code {
            Some(code) => writeln!(f, "Discount ({code}): -{}", self.discount)?,
            None => writeln!(f, "Discount: -{}", self.discount)?,
        }
        writeln!(f, "Total: {}", self.total)?;
        if let Some(notice) = &self.notice {
            writeln!(f, "{notice}")?;
        }
        writeln!(
            f,
            "Place order: {}",
            if self.place_order_enabled { "enabled" } else { "disabled" }
        )
    }
}

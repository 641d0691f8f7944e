use std::collections::HashMap;
use std::num::IntErrorKind;

use bigdecimal::BigDecimal;

use super::errors::ValidationError;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

/// A line-item quantity, always within `MIN_QUANTITY..=MAX_QUANTITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64) as u32)
    }

    /// Reads what the user typed into a quantity box. Integers too large
    /// to represent still clamp to the nearest bound; anything that is not
    /// an integer falls back to the minimum.
    pub fn parse_input(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(value) => Self::clamped(value),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Self(MAX_QUANTITY),
            Err(_) => Self(MIN_QUANTITY),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self::clamped(self.0 as i64 + 1)
    }

    pub fn decrement(self) -> Self {
        Self::clamped(self.0 as i64 - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(MIN_QUANTITY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub cart_product_id: String,
    pub product_id: String,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: Quantity,
    pub unit_price: BigDecimal,
    /// Server-computed; never recomputed from `unit_price * quantity`.
    pub total_price: BigDecimal,
    pub selected: bool,
}

/// Proof that a price-bearing update was issued for an item. Only the
/// most recent ticket per item may write its response back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicket {
    pub cart_product_id: String,
    pub version: u64,
}

/// In-memory mirror of a cart, the single source the render layer reads.
#[derive(Debug, Clone, Default)]
pub struct CartViewState {
    cart_id: String,
    items: Vec<CartLineItem>,
    versions: HashMap<String, u64>,
}

impl CartViewState {
    /// Builds state from a server payload, keeping server order and the
    /// first occurrence of any repeated `cart_product_id`.
    pub fn from_server(cart_id: impl Into<String>, items: Vec<CartLineItem>) -> Self {
        let mut unique: Vec<CartLineItem> = Vec::with_capacity(items.len());
        for item in items {
            if unique
                .iter()
                .all(|existing| existing.cart_product_id != item.cart_product_id)
            {
                unique.push(item);
            } else {
                log::warn!(
                    "Dropping duplicate cart product {} from server payload",
                    item.cart_product_id
                );
            }
        }
        Self {
            cart_id: cart_id.into(),
            items: unique,
            versions: HashMap::new(),
        }
    }

    pub fn empty(cart_id: impl Into<String>) -> Self {
        Self::from_server(cart_id, Vec::new())
    }

    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, cart_product_id: &str) -> Result<&CartLineItem, ValidationError> {
        self.items
            .iter()
            .find(|i| i.cart_product_id == cart_product_id)
            .ok_or_else(|| ValidationError::UnknownItem(cart_product_id.to_string()))
    }

    fn item_mut(&mut self, cart_product_id: &str) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|i| i.cart_product_id == cart_product_id)
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter().filter(|i| i.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_items().count()
    }

    /// Sum of `total_price` over the selected items.
    pub fn subtotal(&self) -> BigDecimal {
        self.selected_items()
            .fold(BigDecimal::from(0), |acc, i| acc + &i.total_price)
    }

    pub fn begin_update(&mut self, cart_product_id: &str) -> Result<UpdateTicket, ValidationError> {
        self.item(cart_product_id)?;
        let version = self
            .versions
            .entry(cart_product_id.to_string())
            .and_modify(|v| *v += 1)
            .or_insert(1);
        Ok(UpdateTicket {
            cart_product_id: cart_product_id.to_string(),
            version: *version,
        })
    }

    pub fn is_latest(&self, ticket: &UpdateTicket) -> bool {
        self.versions.get(&ticket.cart_product_id) == Some(&ticket.version)
    }

    /// Writes a server-confirmed quantity and total back. Returns `false`
    /// when a newer update for the same item has been issued since, or the
    /// item is gone.
    pub fn apply_update(
        &mut self,
        ticket: &UpdateTicket,
        quantity: Quantity,
        total_price: BigDecimal,
    ) -> bool {
        if !self.is_latest(ticket) {
            log::debug!(
                "Discarding stale update v{} for cart product {}",
                ticket.version,
                ticket.cart_product_id
            );
            return false;
        }
        match self.item_mut(&ticket.cart_product_id) {
            Some(item) => {
                item.quantity = quantity;
                item.total_price = total_price;
                true
            }
            None => false,
        }
    }

    pub fn set_selected(
        &mut self,
        cart_product_id: &str,
        selected: bool,
    ) -> Result<(), ValidationError> {
        let item = self
            .item_mut(cart_product_id)
            .ok_or_else(|| ValidationError::UnknownItem(cart_product_id.to_string()))?;
        item.selected = selected;
        Ok(())
    }

    pub fn remove(&mut self, cart_product_id: &str) -> Result<CartLineItem, ValidationError> {
        let index = self
            .items
            .iter()
            .position(|i| i.cart_product_id == cart_product_id)
            .ok_or_else(|| ValidationError::UnknownItem(cart_product_id.to_string()))?;
        self.versions.remove(cart_product_id);
        Ok(self.items.remove(index))
    }
}

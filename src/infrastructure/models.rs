use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::{CartLineItem, Quantity};
use crate::domain::checkout::{OrderRequest, PaymentMethod, ShippingAddress, UserProfile};
use crate::domain::ports::{CartSnapshot, LineItemUpdate};

// ── Field codecs ─────────────────────────────────────────────────────────────

/// The backend sends identifiers as numbers or strings depending on the
/// endpoint; the client treats them all as opaque strings.
mod id {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("expected an id, got {other}"))),
        }
    }
}

/// Money as a JSON number (or numeric string) on the wire, `BigDecimal`
/// in memory. Parsed from the literal text so no binary float rounding
/// creeps in.
pub(crate) mod money {
    use std::str::FromStr;

    use bigdecimal::{BigDecimal, ToPrimitive};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigDecimal, D::Error> {
        let text = match Value::deserialize(d)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            Value::Null => return Ok(BigDecimal::from(0)),
            other => return Err(D::Error::custom(format!("expected an amount, got {other}"))),
        };
        BigDecimal::from_str(text.trim())
            .map_err(|e| D::Error::custom(format!("invalid amount '{text}': {e}")))
    }

    pub fn serialize<S: Serializer>(amount: &BigDecimal, s: S) -> Result<S::Ok, S::Error> {
        if amount.is_integer() {
            if let Some(units) = amount.to_i64() {
                return s.serialize_i64(units);
            }
        }
        match amount.to_f64() {
            Some(value) => s.serialize_f64(value),
            None => Err(serde::ser::Error::custom(format!(
                "unrepresentable amount {amount}"
            ))),
        }
    }
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

fn default_quantity() -> i64 {
    1
}

// ── Cart DTOs ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductDto {
    #[serde(alias = "idCartProduct", alias = "id", with = "id")]
    pub cart_product_id: String,
    #[serde(with = "id")]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default = "zero", with = "money", alias = "price")]
    pub unit_price: BigDecimal,
    #[serde(with = "money")]
    pub total_price: BigDecimal,
    #[serde(default, alias = "selected")]
    pub choose: Option<bool>,
}

impl From<CartProductDto> for CartLineItem {
    fn from(dto: CartProductDto) -> Self {
        CartLineItem {
            cart_product_id: dto.cart_product_id,
            product_id: dto.product_id,
            product_name: dto.product_name,
            image_url: dto.image_url,
            quantity: Quantity::clamped(dto.quantity),
            unit_price: dto.unit_price,
            total_price: dto.total_price,
            selected: dto.choose.unwrap_or(false),
        }
    }
}

impl From<CartProductDto> for LineItemUpdate {
    fn from(dto: CartProductDto) -> Self {
        LineItemUpdate {
            quantity: Quantity::clamped(dto.quantity),
            total_price: dto.total_price,
            selected: dto.choose,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    #[serde(alias = "idCart", alias = "id", with = "id")]
    pub cart_id: String,
    #[serde(default, alias = "cartProducts", alias = "items")]
    pub products: Vec<CartProductDto>,
}

impl From<CartDto> for CartSnapshot {
    fn from(dto: CartDto) -> Self {
        CartSnapshot {
            cart_id: dto.cart_id,
            items: dto.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartProductBody {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choose: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartProductBody<'a> {
    pub product_id: &'a str,
    pub quantity: u32,
}

// ── Discount DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountBody<'a> {
    pub discount_code: &'a str,
    #[serde(with = "money")]
    pub order_total: BigDecimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountResponse {
    #[serde(with = "money")]
    pub discount_amount: BigDecimal,
}

// ── Order DTOs ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestBody {
    pub shipping_address_id: String,
    pub payment_method: PaymentMethod,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(with = "money")]
    pub shipping_fee: BigDecimal,
    #[serde(with = "money")]
    pub discount_amount: BigDecimal,
    #[serde(with = "money")]
    pub total_amount: BigDecimal,
}

impl From<&OrderRequest> for OrderRequestBody {
    fn from(r: &OrderRequest) -> Self {
        OrderRequestBody {
            shipping_address_id: r.shipping_address_id.clone(),
            payment_method: r.payment_method,
            note: r.note.clone(),
            discount_code: r.discount_code.clone(),
            shipping_fee: r.shipping_fee.clone(),
            discount_amount: r.discount.clone(),
            total_amount: r.total_amount.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    #[serde(alias = "orderId", with = "id")]
    pub id_order: String,
}

// ── User DTOs ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    #[serde(alias = "idAddress", with = "id")]
    pub id: String,
    #[serde(default, alias = "recipientName", alias = "fullName")]
    pub recipient: String,
    #[serde(default, alias = "phoneNumber")]
    pub phone: String,
    #[serde(default, alias = "addressLine")]
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

impl From<AddressDto> for ShippingAddress {
    fn from(dto: AddressDto) -> Self {
        ShippingAddress {
            id: dto.id,
            recipient: dto.recipient,
            phone: dto.phone,
            address: dto.address,
            is_default: dto.is_default,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoDto {
    #[serde(alias = "idUser", with = "id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressDto>,
}

impl From<UserInfoDto> for UserProfile {
    fn from(dto: UserInfoDto) -> Self {
        UserProfile {
            id: dto.id,
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            addresses: dto.addresses.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn cart_payload_with_numeric_ids() {
        let dto: CartDto = serde_json::from_value(json!({
            "idCart": 12,
            "cartProducts": [{
                "idCartProduct": 7,
                "productId": 3,
                "productName": "Tea",
                "quantity": 250,
                "unitPrice": 20000,
                "totalPrice": 40000.50,
                "choose": true
            }]
        }))
        .unwrap();
        let snapshot = CartSnapshot::from(dto);
        assert_eq!(snapshot.cart_id, "12");
        let item = &snapshot.items[0];
        assert_eq!(item.cart_product_id, "7");
        assert_eq!(item.product_id, "3");
        assert_eq!(item.quantity.get(), 99);
        assert_eq!(item.total_price, BigDecimal::from_str("40000.5").unwrap());
        assert!(item.selected);
    }

    #[test]
    fn missing_choose_means_not_selected() {
        let dto: CartProductDto = serde_json::from_value(json!({
            "cartProductId": "a",
            "productId": "p",
            "totalPrice": "15000"
        }))
        .unwrap();
        let item = CartLineItem::from(dto);
        assert!(!item.selected);
        assert_eq!(item.quantity.get(), 1);
        assert_eq!(item.unit_price, BigDecimal::from(0));
    }

    #[test]
    fn update_body_omits_choose_when_unset() {
        let body = serde_json::to_value(UpdateCartProductBody {
            quantity: 3,
            choose: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "quantity": 3 }));
    }

    #[test]
    fn order_body_uses_numbers_for_money() {
        let request = OrderRequest {
            shipping_address_id: "addr-1".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            note: String::new(),
            discount_code: None,
            shipping_fee: BigDecimal::from(30000),
            discount: BigDecimal::from(0),
            total_amount: BigDecimal::from(130000),
        };
        let body = serde_json::to_value(OrderRequestBody::from(&request)).unwrap();
        assert_eq!(body["paymentMethod"], "BANK_TRANSFER");
        assert_eq!(body["totalAmount"], json!(130000));
        assert_eq!(body["discountAmount"], json!(0));
        assert!(body.get("discountCode").is_none());
    }

    #[test]
    fn bad_amount_is_rejected() {
        let result: Result<ApplyDiscountResponse, _> =
            serde_json::from_value(json!({ "discountAmount": "lots" }));
        assert!(result.is_err());
    }
}

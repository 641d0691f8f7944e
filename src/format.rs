//! Display formatting for money and dates (Vietnamese storefront style).

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};

pub const CURRENCY_SUFFIX: &str = " ₫";

/// `150000` -> `"150.000 ₫"`. Amounts are rounded to whole dong.
pub fn format_currency(amount: &BigDecimal) -> String {
    let (units, _) = amount
        .with_scale_round(0, RoundingMode::HalfUp)
        .into_bigint_and_exponent();
    let digits = units.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if grouped.chars().all(|c| c == '0' || c == '.') {
        ""
    } else {
        sign
    };
    format!("{sign}{grouped}{CURRENCY_SUFFIX}")
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

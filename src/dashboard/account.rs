//! Demo account figures.
//!
//! Everything here is hard-coded; there is no banking backend.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Shown in place of the amount while the balance is hidden.
pub const MASKED_BALANCE: &str = "₺•••.•••,••";

/// Account summary displayed on the overview card.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub holder: String,
    pub customer_no: String,
    pub balance: Decimal,
    /// Net change over the last seven days.
    pub weekly_change: Decimal,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            holder: "Ahmet Yılmaz".to_string(),
            customer_no: "123456".to_string(),
            balance: dec!(80120.50),
            weekly_change: dec!(1450.20),
        }
    }
}

/// Format an amount the way Turkish banking UIs do: `₺80.120,50`.
pub fn format_try(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).abs();
    let text = format!("{rounded:.2}");
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₺{grouped},{frac}")
}

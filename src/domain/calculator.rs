//! Pure arithmetic for splitting a price into payment legs.

use super::money::{Money, Percentage};
use super::order::SubServiceCharge;
use serde::{Deserialize, Serialize};

/// How a customer settles an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Full,
    Upfront,
    Remaining,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Full => "full",
            PaymentType::Upfront => "upfront",
            PaymentType::Remaining => "remaining",
        }
    }
}

/// The amount due on `base_price` for a single leg.
///
/// The remaining leg is derived from the rounded upfront leg, so the two legs
/// always add back up to `base_price`.
pub fn compute_amount(base_price: Money, percentage: Percentage, mode: PaymentType) -> Money {
    match mode {
        PaymentType::Full => base_price,
        PaymentType::Upfront => upfront_leg(base_price, percentage),
        PaymentType::Remaining => base_price - upfront_leg(base_price, percentage),
    }
}

/// [`compute_amount`] plus every sub-service charge.
pub fn compute_total(
    base_price: Money,
    percentage: Percentage,
    mode: PaymentType,
    sub_service_charges: &[SubServiceCharge],
) -> Money {
    compute_amount(base_price, percentage, mode) + sum_charges(sub_service_charges)
}

pub fn sum_charges(sub_service_charges: &[SubServiceCharge]) -> Money {
    sub_service_charges.iter().map(|c| c.price).sum()
}

fn upfront_leg(base_price: Money, percentage: Percentage) -> Money {
    let raw = base_price.value() * percentage.as_decimal() / rust_decimal::Decimal::ONE_HUNDRED;
    Money::from_rounded(raw)
}

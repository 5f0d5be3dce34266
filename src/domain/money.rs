use crate::error::EscrowError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Number of fractional digits in the minor currency unit.
pub const MINOR_UNIT_DP: u32 = 2;

/// Largest accepted monetary value, in major units.
///
/// Percentages and sums over bounded values then stay far inside `Decimal`'s
/// range, so arithmetic on `Money` cannot overflow.
pub const MAX_MAJOR_UNITS: i64 = 1_000_000_000_000_000;

/// Upfront percentage applied when an order does not configure one.
pub const DEFAULT_UPFRONT_PERCENTAGE: u8 = 50;

/// Rounds half-up to the minor currency unit.
///
/// `MidpointAwayFromZero` is half-up for the non-negative values money takes here.
pub fn round_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Serializes money at the minor-unit scale (`4000.00`), for reports.
pub fn serialize_minor<S: serde::Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(money)
}

/// A non-negative monetary value expressed to at most the minor currency unit.
///
/// Wraps `rust_decimal::Decimal` so that prices and running totals can never
/// go negative or carry sub-minor-unit fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, EscrowError> {
        if value < Decimal::ZERO {
            return Err(EscrowError::validation("money cannot be negative"));
        }
        if value > Decimal::from(MAX_MAJOR_UNITS) {
            return Err(EscrowError::validation(format!(
                "{} exceeds the largest accepted amount of {}",
                value, MAX_MAJOR_UNITS
            )));
        }
        if round_minor(value) != value {
            return Err(EscrowError::validation(format!(
                "{} has more than {} fractional digits",
                value, MINOR_UNIT_DP
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction that refuses to go below zero.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        if rhs.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - rhs.0))
        }
    }

    /// `self - rhs`, floored at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs).unwrap_or(Self::ZERO)
    }

    pub(crate) fn from_rounded(value: Decimal) -> Self {
        Self(round_minor(value).max(Decimal::ZERO))
    }
}

impl TryFrom<Decimal> for Money {
    type Error = EscrowError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// A strictly positive amount carried by a payment or remittance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, EscrowError> {
        let money = Money::new(value)?;
        if money.is_zero() {
            return Err(EscrowError::validation("amount must be positive"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EscrowError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<Money> for Amount {
    type Error = EscrowError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Self::new(value.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Share of the price collected by the upfront installment, 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub fn new(value: u8) -> Result<Self, EscrowError> {
        if value > 100 {
            return Err(EscrowError::validation(format!(
                "percentage {} is outside 0..=100",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self(DEFAULT_UPFRONT_PERCENTAGE)
    }
}

impl TryFrom<u8> for Percentage {
    type Error = EscrowError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

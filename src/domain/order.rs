use super::bank_profile::BankDetails;
use super::calculator::{PaymentType, compute_amount, compute_total, sum_charges};
use super::ids::{OrderId, OrganizationId};
use super::money::{Amount, Money, Percentage};
use crate::error::{EscrowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PartiallyPaid,
    FullyPaid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PartiallyPaid => "partially_paid",
            OrderStatus::FullyPaid => "fully_paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Status implied by how much of `required` has been paid.
    pub fn for_payment(paid: Money, required: Money) -> Self {
        if paid.is_zero() {
            OrderStatus::Pending
        } else if paid < required {
            OrderStatus::PartiallyPaid
        } else {
            OrderStatus::FullyPaid
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An add-on priced independently of the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubServiceCharge {
    pub code: String,
    pub price: Money,
}

impl SubServiceCharge {
    pub fn new(code: impl Into<String>, price: Money) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(EscrowError::validation("sub-service code is required"));
        }
        Ok(Self { code, price })
    }
}

/// Immutable facts an order is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    pub order_id: OrderId,
    pub product_id: String,
    pub organization_id: OrganizationId,
    pub customer_id: String,
    pub product_price: Money,
    #[serde(default)]
    pub upfront_payment_percentage: Option<Percentage>,
}

impl OrderContext {
    pub fn validate(&self) -> Result<()> {
        if self.order_id.as_str().trim().is_empty() {
            return Err(EscrowError::validation("order id is required"));
        }
        if self.product_id.trim().is_empty() {
            return Err(EscrowError::validation("product id is required"));
        }
        if self.organization_id.as_str().trim().is_empty() {
            return Err(EscrowError::validation("organization id is required"));
        }
        if self.customer_id.trim().is_empty() {
            return Err(EscrowError::validation("customer id is required"));
        }
        Ok(())
    }

    pub fn percentage(&self) -> Percentage {
        self.upfront_payment_percentage.unwrap_or_default()
    }
}

/// Before/after status pair produced by every accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl StatusChange {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// The escrow order aggregate.
///
/// Owns the payment transition table: the status is always a function of
/// `total_amount_paid` against [`Order::required_amount`], except for the
/// explicit cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: String,
    pub organization_id: OrganizationId,
    pub customer_id: String,
    pub product_price: Money,
    pub upfront_payment_percentage: Percentage,
    pub sub_service_charges: Vec<SubServiceCharge>,
    pub payment_type: PaymentType,
    pub total_amount_paid: Money,
    pub order_status: OrderStatus,
    pub organization_bank_details: Option<BankDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        context: OrderContext,
        payment_type: PaymentType,
        sub_service_charges: Vec<SubServiceCharge>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        context.validate()?;
        if payment_type == PaymentType::Remaining {
            return Err(EscrowError::transition(
                "an order cannot start with a remaining payment",
            ));
        }
        let upfront_payment_percentage = context.percentage();
        Ok(Self {
            id: context.order_id,
            product_id: context.product_id,
            organization_id: context.organization_id,
            customer_id: context.customer_id,
            product_price: context.product_price,
            upfront_payment_percentage,
            sub_service_charges,
            payment_type,
            total_amount_paid: Money::ZERO,
            order_status: OrderStatus::Pending,
            organization_bank_details: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Product price plus every sub-service charge.
    pub fn required_amount(&self) -> Money {
        self.product_price + sum_charges(&self.sub_service_charges)
    }

    pub fn outstanding(&self) -> Money {
        self.required_amount() - self.total_amount_paid
    }

    /// Balance left after the upfront installment; zero outside that window.
    pub fn upfront_remaining_balance(&self) -> Money {
        if self.payment_type == PaymentType::Upfront
            && self.order_status == OrderStatus::PartiallyPaid
        {
            self.outstanding()
        } else {
            Money::ZERO
        }
    }

    /// Whether `context` describes this order.
    pub fn matches_context(&self, context: &OrderContext) -> bool {
        self.id == context.order_id
            && self.product_id == context.product_id
            && self.organization_id == context.organization_id
            && self.customer_id == context.customer_id
            && self.product_price == context.product_price
            && self.upfront_payment_percentage == context.percentage()
    }

    /// Checks the transition table for a payment of `payment_type`.
    pub fn ensure_payment_allowed(&self, payment_type: PaymentType) -> Result<()> {
        match (self.order_status, payment_type) {
            (OrderStatus::FullyPaid, _) => Err(EscrowError::AlreadySettled(self.id.to_string())),
            (OrderStatus::Cancelled, _) => Err(EscrowError::transition(format!(
                "order {} is cancelled",
                self.id
            ))),
            (OrderStatus::Pending, PaymentType::Full | PaymentType::Upfront) => Ok(()),
            (OrderStatus::Pending, PaymentType::Remaining) => Err(EscrowError::transition(
                format!("order {} has no upfront payment yet", self.id),
            )),
            (OrderStatus::PartiallyPaid, PaymentType::Remaining)
                if matches!(
                    self.payment_type,
                    PaymentType::Upfront | PaymentType::Remaining
                ) =>
            {
                Ok(())
            }
            (OrderStatus::PartiallyPaid, PaymentType::Full)
                if self.payment_type == PaymentType::Full =>
            {
                Ok(())
            }
            (OrderStatus::PartiallyPaid, requested) => Err(EscrowError::transition(format!(
                "order {} is partially paid by {} and cannot take a {} payment",
                self.id,
                self.payment_type.as_str(),
                requested.as_str()
            ))),
        }
    }

    /// Amount a new payment of `payment_type` must carry.
    ///
    /// Sub-service charges ride on the first leg; the remaining leg is the
    /// price left over after the rounded upfront leg.
    pub fn amount_due(&self, payment_type: PaymentType) -> Result<Money> {
        self.ensure_payment_allowed(payment_type)?;
        let pct = self.upfront_payment_percentage;
        let due = match payment_type {
            PaymentType::Full => self.outstanding(),
            PaymentType::Upfront => compute_total(
                self.product_price,
                pct,
                PaymentType::Upfront,
                &self.sub_service_charges,
            ),
            PaymentType::Remaining => {
                compute_amount(self.product_price, pct, PaymentType::Remaining)
                    .min(self.outstanding())
            }
        };
        if due.is_zero() {
            return Err(EscrowError::validation(format!(
                "nothing is due for a {} payment on order {}",
                payment_type.as_str(),
                self.id
            )));
        }
        Ok(due)
    }

    /// Applies a gateway-confirmed payment.
    ///
    /// Rejects, without mutating, any payment that would exceed the required amount.
    pub fn record_payment(
        &mut self,
        amount: Amount,
        payment_type: PaymentType,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        self.ensure_payment_allowed(payment_type)?;
        let outstanding = self.outstanding();
        let paid = Money::from(amount);
        if paid > outstanding {
            return Err(EscrowError::Overpayment {
                attempted: paid.value(),
                outstanding: outstanding.value(),
            });
        }

        let from = self.order_status;
        self.total_amount_paid += paid;
        self.payment_type = payment_type;
        self.order_status = OrderStatus::for_payment(self.total_amount_paid, self.required_amount());
        self.touch(now);
        Ok(StatusChange {
            from,
            to: self.order_status,
        })
    }

    /// Cancels a pending or partially paid order.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<StatusChange> {
        match self.order_status {
            OrderStatus::Pending | OrderStatus::PartiallyPaid => {
                let from = self.order_status;
                self.order_status = OrderStatus::Cancelled;
                self.touch(now);
                Ok(StatusChange {
                    from,
                    to: OrderStatus::Cancelled,
                })
            }
            OrderStatus::FullyPaid => Err(EscrowError::transition(format!(
                "order {} is fully paid and cannot be cancelled",
                self.id
            ))),
            OrderStatus::Cancelled => Err(EscrowError::transition(format!(
                "order {} is already cancelled",
                self.id
            ))),
        }
    }

    /// Stores the bank snapshot used for remittance.
    pub fn attach_bank_details(&mut self, details: BankDetails, now: DateTime<Utc>) {
        self.organization_bank_details = Some(details);
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}

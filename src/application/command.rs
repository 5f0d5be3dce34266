use super::bank_profile::BankProfileInput;
use super::delivery::DeliveryRequest;
use super::payment::{PaymentInitiation, PaymentRequest};
use super::remittance::RemittanceRequest;
use crate::domain::bank_profile::OrganizationBankProfile;
use crate::domain::delivery::DeliveryConfirmation;
use crate::domain::ids::OrderId;
use crate::domain::order::Order;
use crate::domain::remittance::RemittanceRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A serialized workflow operation, tagged by `command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EscrowCommand {
    RegisterBankProfile(BankProfileInput),
    InitiatePayment(PaymentRequest),
    /// Gateway callback, keyed by reference or, failing that, by order id.
    ConfirmPayment {
        #[serde(default)]
        reference: Option<String>,
        #[serde(default)]
        order_id: Option<OrderId>,
        amount: Decimal,
    },
    CancelOrder {
        order_id: OrderId,
    },
    ConfirmDelivery(DeliveryRequest),
    ProcessRemittance(RemittanceRequest),
}

impl EscrowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EscrowCommand::RegisterBankProfile(_) => "register_bank_profile",
            EscrowCommand::InitiatePayment(_) => "initiate_payment",
            EscrowCommand::ConfirmPayment { .. } => "confirm_payment",
            EscrowCommand::CancelOrder { .. } => "cancel_order",
            EscrowCommand::ConfirmDelivery(_) => "confirm_delivery",
            EscrowCommand::ProcessRemittance(_) => "process_remittance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    BankProfile(OrganizationBankProfile),
    PaymentInitiated(PaymentInitiation),
    Order(Order),
    Delivered(DeliveryConfirmation),
    Remitted(RemittanceRecord),
}

use super::bank_profile::BankProfileService;
use super::command::{CommandOutcome, EscrowCommand};
use super::context::{EscrowContext, Stores};
use super::delivery::DeliveryConfirmationService;
use super::payment::PaymentIntake;
use super::remittance::RemittanceService;
use crate::config::EscrowConfig;
use crate::domain::calculator::PaymentType;
use crate::domain::ids::OrderId;
use crate::domain::money::{Amount, Money, serialize_minor};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{NotifierBox, PaymentGatewayBox};
use crate::error::{EscrowError, Result};
use serde::Serialize;
use std::sync::Arc;

/// Final state of one order, as reported by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    #[serde(serialize_with = "serialize_minor")]
    pub product_price: Money,
    #[serde(serialize_with = "serialize_minor")]
    pub required_amount: Money,
    #[serde(serialize_with = "serialize_minor")]
    pub total_amount_paid: Money,
    #[serde(serialize_with = "serialize_minor")]
    pub upfront_remaining_balance: Money,
    pub delivered: bool,
    pub remitted: bool,
}

/// The entry point for the escrow workflow.
///
/// `EscrowEngine` wires the payment, delivery, remittance and bank-profile
/// services over one shared [`EscrowContext`], so they see the same stores
/// and the same per-order locks.
pub struct EscrowEngine {
    ctx: Arc<EscrowContext>,
    payments: PaymentIntake,
    deliveries: DeliveryConfirmationService,
    remittances: RemittanceService,
    bank_profiles: BankProfileService,
}

impl EscrowEngine {
    /// Creates a new `EscrowEngine`.
    ///
    /// # Arguments
    ///
    /// * `stores` - Persistence for orders, intents, confirmations, remittances and profiles.
    /// * `gateway` - The payment gateway checkouts are opened with.
    /// * `notifier` - Where status, delivery and settlement events are published.
    /// * `config` - Timeouts and adapter settings.
    pub fn new(
        stores: Stores,
        gateway: PaymentGatewayBox,
        notifier: NotifierBox,
        config: EscrowConfig,
    ) -> Self {
        let ctx = Arc::new(EscrowContext::new(stores, gateway, notifier, config));
        Self {
            payments: PaymentIntake::new(ctx.clone()),
            deliveries: DeliveryConfirmationService::new(ctx.clone()),
            remittances: RemittanceService::new(ctx.clone()),
            bank_profiles: BankProfileService::new(ctx.clone()),
            ctx,
        }
    }

    pub fn payments(&self) -> &PaymentIntake {
        &self.payments
    }

    pub fn deliveries(&self) -> &DeliveryConfirmationService {
        &self.deliveries
    }

    pub fn remittances(&self) -> &RemittanceService {
        &self.remittances
    }

    pub fn bank_profiles(&self) -> &BankProfileService {
        &self.bank_profiles
    }

    pub async fn order(&self, order_id: &OrderId) -> Result<Order> {
        self.ctx.load_order(order_id).await
    }

    /// Dispatches a serialized command to the owning service.
    pub async fn execute(&self, command: EscrowCommand) -> Result<CommandOutcome> {
        match command {
            EscrowCommand::RegisterBankProfile(input) => self
                .bank_profiles
                .register(input)
                .await
                .map(CommandOutcome::BankProfile),
            EscrowCommand::InitiatePayment(request) => self
                .payments
                .initiate_payment(request)
                .await
                .map(CommandOutcome::PaymentInitiated),
            EscrowCommand::ConfirmPayment {
                reference,
                order_id,
                amount,
            } => {
                let amount = Amount::new(amount)?;
                let order = match (reference, order_id) {
                    (Some(reference), _) => self.payments.confirm_payment(&reference, amount).await?,
                    (None, Some(order_id)) => {
                        self.payments.confirm_order_payment(&order_id, amount).await?
                    }
                    (None, None) => {
                        return Err(EscrowError::validation(
                            "confirm_payment needs a reference or an order id",
                        ));
                    }
                };
                Ok(CommandOutcome::Order(order))
            }
            EscrowCommand::CancelOrder { order_id } => self
                .payments
                .cancel_order(&order_id)
                .await
                .map(CommandOutcome::Order),
            EscrowCommand::ConfirmDelivery(request) => self
                .deliveries
                .confirm_delivery(request)
                .await
                .map(CommandOutcome::Delivered),
            EscrowCommand::ProcessRemittance(request) => self
                .remittances
                .process_remittance(request)
                .await
                .map(CommandOutcome::Remitted),
        }
    }

    /// The current state of every order.
    pub async fn order_summaries(&self) -> Result<Vec<OrderSummary>> {
        let orders = self.ctx.stores.orders.get_all().await?;
        let mut summaries = Vec::with_capacity(orders.len());
        for order in orders {
            let delivered = self.ctx.stores.deliveries.get(&order.id).await?.is_some();
            let remitted = self.ctx.stores.remittances.get(&order.id).await?.is_some();
            summaries.push(OrderSummary {
                status: order.order_status,
                payment_type: order.payment_type,
                product_price: order.product_price,
                required_amount: order.required_amount(),
                total_amount_paid: order.total_amount_paid,
                upfront_remaining_balance: order.upfront_remaining_balance(),
                order_id: order.id,
                delivered,
                remitted,
            });
        }
        Ok(summaries)
    }
}

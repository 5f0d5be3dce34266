#![allow(dead_code)]

use order_escrow::application::context::Stores;
use order_escrow::application::delivery::DeliveryRequest;
use order_escrow::application::engine::EscrowEngine;
use order_escrow::application::remittance::RemittanceRequest;
use order_escrow::config::EscrowConfig;
use order_escrow::domain::delivery::{DeliveryEvidence, DeliveryMode};
use order_escrow::domain::events::NotificationEvent;
use order_escrow::domain::money::{Money, Percentage};
use order_escrow::domain::order::OrderContext;
use order_escrow::infrastructure::gateway::SimulatedGateway;
use order_escrow::infrastructure::notify::ChannelNotifier;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn engine() -> (EscrowEngine, UnboundedReceiver<NotificationEvent>) {
    let config = EscrowConfig::default();
    let (notifier, events) = ChannelNotifier::new();
    let engine = EscrowEngine::new(
        Stores::in_memory(),
        Box::new(SimulatedGateway::new(config.gateway.clone())),
        Box::new(notifier),
        config,
    );
    (engine, events)
}

pub fn order(id: &str, price: Decimal, pct: Option<u8>) -> OrderContext {
    OrderContext {
        order_id: id.into(),
        product_id: "p-1".into(),
        organization_id: "org-1".into(),
        customer_id: "c-1".into(),
        product_price: Money::new(price).unwrap(),
        upfront_payment_percentage: pct.map(|p| Percentage::new(p).unwrap()),
    }
}

pub fn pickup(order_id: &str) -> DeliveryRequest {
    DeliveryRequest {
        order_id: order_id.into(),
        delivery_mode: DeliveryMode::PickupCenter,
        delivery_address: None,
        pickup_center_name: Some("Central Hub".into()),
        evidence: DeliveryEvidence::default(),
        satisfaction_declaration: "I received the goods in good condition".into(),
    }
}

pub fn remittance(order_id: &str, amount: Decimal) -> RemittanceRequest {
    RemittanceRequest {
        order_id: order_id.into(),
        amount_remitted: amount,
        settlement_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        operator_bank_name: "Escrow Bank".into(),
        operator_account_number: "1111111111".into(),
        payment_evidence_url: "https://media.localhost/receipt.pdf".into(),
        processed_by: "ops-1".into(),
    }
}

/// Writes `lines` to a temporary JSON Lines file.
pub fn commands_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

pub const REGISTER_BANK: &str = r#"{"command":"register_bank_profile","organization_id":"org-1","bank_name":"First Bank","account_number":"0123456789","account_name":"Acme Ltd"}"#;
pub const INITIATE_UPFRONT: &str = r#"{"command":"initiate_payment","payment_type":"upfront","order":{"order_id":"o-1","product_id":"p-1","organization_id":"org-1","customer_id":"c-1","product_price":"10000","upfront_payment_percentage":40}}"#;
pub const CONFIRM_UPFRONT: &str = r#"{"command":"confirm_payment","order_id":"o-1","amount":"4000"}"#;
pub const INITIATE_REMAINING: &str = r#"{"command":"initiate_payment","payment_type":"remaining","order":{"order_id":"o-1","product_id":"p-1","organization_id":"org-1","customer_id":"c-1","product_price":"10000","upfront_payment_percentage":40}}"#;
pub const CONFIRM_REMAINING: &str = r#"{"command":"confirm_payment","order_id":"o-1","amount":"6000"}"#;

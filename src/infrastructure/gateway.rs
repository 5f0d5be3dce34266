use crate::config::GatewayConfig;
use crate::domain::money::Money;
use crate::domain::ports::{GatewayCheckout, PaymentGateway, PaymentMetadata};
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Stand-in for a hosted checkout: issues a reference and link immediately.
///
/// Confirmation arrives later through `PaymentIntake::confirm_payment`, the
/// same way a webhook from a real gateway would.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    config: GatewayConfig,
}

impl SimulatedGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn initiate(&self, amount: Money, metadata: PaymentMetadata) -> Result<GatewayCheckout> {
        if amount.is_zero() {
            return Err(EscrowError::validation("gateway cannot collect a zero amount"));
        }
        let reference = format!(
            "{}-{}",
            self.config.reference_prefix,
            uuid::Uuid::new_v4().simple()
        );
        let link = format!(
            "{}/{}",
            self.config.checkout_base_url.trim_end_matches('/'),
            reference
        );
        debug!(
            order_id = %metadata.order_id,
            payment_type = metadata.payment_type,
            %amount,
            %reference,
            "checkout created"
        );
        Ok(GatewayCheckout { link, reference })
    }
}

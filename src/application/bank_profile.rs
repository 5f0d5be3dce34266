use super::context::EscrowContext;
use crate::domain::bank_profile::{BankDetails, OrganizationBankProfile};
use crate::domain::ids::OrganizationId;
use crate::error::{EscrowError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankProfileInput {
    pub organization_id: OrganizationId,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

/// Registration and lookup of organization bank profiles.
pub struct BankProfileService {
    ctx: Arc<EscrowContext>,
}

impl BankProfileService {
    pub fn new(ctx: Arc<EscrowContext>) -> Self {
        Self { ctx }
    }

    /// Creates or replaces the organization's bank profile.
    #[instrument(name = "bank_profile.register", skip(self, input), fields(organization_id = %input.organization_id), err)]
    pub async fn register(&self, input: BankProfileInput) -> Result<OrganizationBankProfile> {
        if input.organization_id.as_str().trim().is_empty() {
            return Err(EscrowError::validation("organization id is required"));
        }
        let details = BankDetails::new(input.bank_name, input.account_number, input.account_name)?;
        let now = Utc::now();
        let profile = match self.ctx.stores.bank_profiles.get(&input.organization_id).await? {
            Some(mut profile) => {
                profile.update(details, now);
                profile
            }
            None => OrganizationBankProfile::new(input.organization_id, details, now),
        };
        self.ctx.stores.bank_profiles.store(profile.clone()).await?;
        info!("bank profile saved");
        Ok(profile)
    }

    pub async fn profile(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<OrganizationBankProfile>> {
        self.ctx
            .bounded(
                "bank profile lookup",
                self.ctx.stores.bank_profiles.get(organization_id),
            )
            .await
    }
}

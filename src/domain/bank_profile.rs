use super::ids::OrganizationId;
use crate::error::{EscrowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_ACCOUNT_NUMBER_DIGITS: usize = 10;

/// Account an organization receives remittances into.
///
/// Also used as the immutable snapshot copied onto orders and remittance records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

impl BankDetails {
    pub fn new(
        bank_name: impl Into<String>,
        account_number: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Result<Self> {
        let details = Self {
            bank_name: bank_name.into().trim().to_string(),
            account_number: account_number.into().trim().to_string(),
            account_name: account_name.into().trim().to_string(),
        };
        details.validate()?;
        Ok(details)
    }

    fn validate(&self) -> Result<()> {
        if self.bank_name.is_empty() {
            return Err(EscrowError::validation("bank name is required"));
        }
        if self.account_name.is_empty() {
            return Err(EscrowError::validation("account name is required"));
        }
        if self.account_number.len() < MIN_ACCOUNT_NUMBER_DIGITS
            || !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(EscrowError::validation(format!(
                "account number must be at least {} digits",
                MIN_ACCOUNT_NUMBER_DIGITS
            )));
        }
        Ok(())
    }
}

/// Bank details registered by an organization, keyed by organization id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationBankProfile {
    pub organization_id: OrganizationId,
    #[serde(flatten)]
    pub details: BankDetails,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationBankProfile {
    pub fn new(organization_id: OrganizationId, details: BankDetails, now: DateTime<Utc>) -> Self {
        Self {
            organization_id,
            details,
            updated_at: now,
        }
    }

    /// Replaces the details; `updated_at` never moves backwards.
    pub fn update(&mut self, details: BankDetails, now: DateTime<Utc>) {
        self.details = details;
        self.updated_at = self.updated_at.max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bank_details() {
        let details = BankDetails::new(" First Bank ", "0123456789", "Acme Ltd").unwrap();
        assert_eq!(details.bank_name, "First Bank");
    }

    #[test]
    fn test_account_number_rules() {
        assert!(matches!(
            BankDetails::new("First Bank", "012345678", "Acme"),
            Err(EscrowError::Validation(_))
        ));
        assert!(matches!(
            BankDetails::new("First Bank", "01234567a9", "Acme"),
            Err(EscrowError::Validation(_))
        ));
        assert!(BankDetails::new("First Bank", "012345678901", "Acme").is_ok());
    }

    #[test]
    fn test_names_are_required() {
        assert!(BankDetails::new("", "0123456789", "Acme").is_err());
        assert!(BankDetails::new("First Bank", "0123456789", "  ").is_err());
    }

    #[test]
    fn test_profile_update_keeps_timestamp_monotonic() {
        let later = Utc::now();
        let earlier = later - chrono::Duration::seconds(30);
        let details = BankDetails::new("First Bank", "0123456789", "Acme").unwrap();
        let mut profile = OrganizationBankProfile::new("org-1".into(), details, later);
        let changed = BankDetails::new("Second Bank", "9876543210", "Acme").unwrap();
        profile.update(changed.clone(), earlier);
        assert_eq!(profile.details, changed);
        assert_eq!(profile.updated_at, later);
    }
}

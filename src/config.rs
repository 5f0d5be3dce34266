use crate::error::{EscrowError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub checkout_base_url: String,
    pub reference_prefix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            checkout_base_url: "https://checkout.localhost/pay".to_string(),
            reference_prefix: "ESC".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct DeliveryConfig {
    /// Declaration text clients pre-seed the confirmation form with.
    #[serde(default)]
    pub satisfaction_template: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EscrowConfig {
    /// Bound on every gateway, notifier and bank-profile call.
    pub upstream_timeout_ms: u64,
    /// Bound on waiting for the per-order lock.
    pub lock_timeout_ms: u64,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            upstream_timeout_ms: 5_000,
            lock_timeout_ms: 5_000,
            gateway: GatewayConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl EscrowConfig {
    /// Defaults, then the optional YAML file, then `ESCROW_` env vars
    /// (`__` separates nested keys, e.g. `ESCROW_GATEWAY__REFERENCE_PREFIX`).
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(EscrowConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed("ESCROW_").split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path
            && !path.exists()
        {
            return Err(EscrowError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        Self::figment(path)
            .extract()
            .map_err(|e| EscrowError::Config(e.to_string()))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

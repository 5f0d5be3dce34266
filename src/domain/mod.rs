//! Aggregates, value objects and the ports the application layer drives.

pub mod bank_profile;
pub mod calculator;
pub mod delivery;
pub mod events;
pub mod ids;
pub mod money;
pub mod order;
pub mod payment_intent;
pub mod ports;
pub mod remittance;

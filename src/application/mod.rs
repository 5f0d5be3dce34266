//! Application layer orchestrating the escrow workflow.
//!
//! Services share one [`context::EscrowContext`]. Each operation that mutates
//! an order runs under that order's lock, so confirmations, cancellations,
//! deliveries and remittances on the same order are serialized while
//! different orders proceed concurrently.

pub mod bank_profile;
pub mod command;
pub mod context;
pub mod delivery;
pub mod engine;
pub mod locks;
pub mod payment;
pub mod remittance;

#[cfg(test)]
pub(crate) mod testing;

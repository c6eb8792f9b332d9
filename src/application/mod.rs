//! Application layer: turning payment orders into processed payments.
//!
//! `Checkout` is the entry point used by the CLI. It applies one policy and one
//! event sink to every payment it creates.

pub mod checkout;
pub mod order;

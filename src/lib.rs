//! A polymorphic payment model: one shared lifecycle contract specialised by
//! credit card, PayPal, cash and Bitcoin payments.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;
pub mod policy;

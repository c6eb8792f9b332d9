//! Payment value objects, lifecycle rules and the ports they talk through.

pub mod events;
pub mod methods;
pub mod money;
pub mod payment;
pub mod ports;
pub mod status;

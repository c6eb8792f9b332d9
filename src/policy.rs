//! Tunable business constants.
//!
//! Every fee rate and limit the payment methods apply lives here, both as a
//! named constant and as a field of [`PaymentPolicy`], which callers can load
//! from JSON to override the defaults.

use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const CREDIT_CARD_FEE_PERCENTAGE: Decimal = dec!(2.9);
pub const PAYPAL_FEE_PERCENTAGE: Decimal = dec!(3.5);
pub const PAYPAL_FIXED_FEE: Decimal = dec!(0.30);
pub const CASH_FEE_PERCENTAGE: Decimal = dec!(0);
pub const BITCOIN_FEE_PERCENTAGE: Decimal = dec!(0.5);
pub const PAYPAL_TRANSACTION_LIMIT: Decimal = dec!(10000);
pub const CASH_TRANSACTION_LIMIT: Decimal = dec!(10000);
pub const REQUIRED_CONFIRMATIONS: u32 = 3;
pub const CONFIRMATION_POLLS: u32 = 3;

/// Fee rates (in percent), limits and confirmation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentPolicy {
    pub credit_card_fee_percentage: Decimal,
    pub paypal_fee_percentage: Decimal,
    pub paypal_fixed_fee: Decimal,
    pub cash_fee_percentage: Decimal,
    pub bitcoin_fee_percentage: Decimal,
    pub paypal_transaction_limit: Decimal,
    pub cash_transaction_limit: Decimal,
    /// Confirmations after which a Bitcoin payment counts as confirmed.
    pub required_confirmations: u32,
    /// Simulated network polls per `process` call; each poll adds one confirmation.
    pub confirmation_polls: u32,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            credit_card_fee_percentage: CREDIT_CARD_FEE_PERCENTAGE,
            paypal_fee_percentage: PAYPAL_FEE_PERCENTAGE,
            paypal_fixed_fee: PAYPAL_FIXED_FEE,
            cash_fee_percentage: CASH_FEE_PERCENTAGE,
            bitcoin_fee_percentage: BITCOIN_FEE_PERCENTAGE,
            paypal_transaction_limit: PAYPAL_TRANSACTION_LIMIT,
            cash_transaction_limit: CASH_TRANSACTION_LIMIT,
            required_confirmations: REQUIRED_CONFIRMATIONS,
            confirmation_polls: CONFIRMATION_POLLS,
        }
    }
}

impl PaymentPolicy {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let policy: Self = serde_json::from_reader(BufReader::new(file))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Fee rates must lie in 0..=100 percent; the fixed fee and limits must
    /// not be negative.
    pub fn validate(&self) -> Result<()> {
        let percentages = [
            ("credit_card_fee_percentage", self.credit_card_fee_percentage),
            ("paypal_fee_percentage", self.paypal_fee_percentage),
            ("cash_fee_percentage", self.cash_fee_percentage),
            ("bitcoin_fee_percentage", self.bitcoin_fee_percentage),
        ];
        for (field, value) in percentages {
            if value.is_sign_negative() || value > Decimal::ONE_HUNDRED {
                return Err(PaymentError::InvalidPolicy {
                    field,
                    requirement: "between 0 and 100",
                    value,
                });
            }
        }

        let amounts = [
            ("paypal_fixed_fee", self.paypal_fixed_fee),
            ("paypal_transaction_limit", self.paypal_transaction_limit),
            ("cash_transaction_limit", self.cash_transaction_limit),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                return Err(PaymentError::InvalidPolicy {
                    field,
                    requirement: "non-negative",
                    value,
                });
            }
        }
        Ok(())
    }
}

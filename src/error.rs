use crate::domain::status::PaymentStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while constructing payments or moving data in and out of the crate.
///
/// Business outcomes (validation failures, refused transitions) are not errors;
/// they surface as `false` returns with a [`ValidationError`] or [`Refusal`]
/// reported through the event sink.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("Amount tendered ({tendered}) does not cover amount due ({due})")]
    InsufficientTender { due: Decimal, tendered: Decimal },
    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),
    #[error("Wallet address must not be empty")]
    EmptyWalletAddress,
    #[error("Converting ${amount} at {rate} USD/BTC is out of range")]
    ConversionOverflow { amount: Decimal, rate: Decimal },
    #[error("Invalid policy: `{field}` must be {requirement}, got {value}")]
    InvalidPolicy {
        field: &'static str,
        requirement: &'static str,
        value: Decimal,
    },
    #[error("Missing field `{field}` for {method} payment")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Why a payment failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("card number must be 13-19 digits")]
    InvalidCardNumber,
    #[error("card expired on {0}")]
    CardExpired(chrono::NaiveDate),
    #[error("CVV must be exactly 3 characters")]
    InvalidCvv,
    #[error("cardholder name is required")]
    MissingCardholder,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("amount {amount} exceeds the {limit} limit")]
    LimitExceeded { amount: Decimal, limit: Decimal },
    #[error("amount tendered {tendered} is less than {due}")]
    InsufficientTender { due: Decimal, tendered: Decimal },
    #[error("wallet address must be 26-35 characters, got {0}")]
    InvalidWalletAddress(usize),
    #[error("exchange rate must be positive")]
    NonPositiveRate,
    #[error("bitcoin amount must be positive")]
    NonPositiveBitcoinAmount,
}

/// Why a status-gated operation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("payment is {0}, not pending")]
    NotPending(PaymentStatus),
    #[error("payment is {0}, only completed payments can be refunded")]
    NotCompleted(PaymentStatus),
    #[error("refund amount {requested} must be positive and at most {original}")]
    InvalidRefundAmount { requested: Decimal, original: Decimal },
    #[error("payment is completed, issue a refund instead")]
    AlreadyCompleted,
    #[error("payment is already {0}")]
    AlreadyFinal(PaymentStatus),
    #[error("confirmed blockchain transactions cannot be cancelled")]
    ConfirmedOnChain,
    #[error("payment is not awaiting confirmations")]
    NotAwaitingConfirmations,
}

use super::{Narrator, StepOutcome};
use crate::domain::events::PaymentEvent;
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_CARD_DIGITS: usize = 13;
const MAX_CARD_DIGITS: usize = 19;
const CVV_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    /// Detects the brand from the issuer prefix of a digits-only card number.
    pub fn detect(number: &str) -> Self {
        let prefix = |len: usize| number.get(..len).and_then(|p| p.parse::<u32>().ok());

        if number.starts_with('4') {
            CardBrand::Visa
        } else if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
            CardBrand::Mastercard
        } else if matches!(prefix(2), Some(34 | 37)) {
            CardBrand::Amex
        } else if prefix(4) == Some(6011) || prefix(2) == Some(65) {
            CardBrand::Discover
        } else {
            CardBrand::Unknown
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Amex => "American Express",
            CardBrand::Discover => "Discover",
            CardBrand::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Card verification value. Never printed.
struct Cvv(String);

impl fmt::Debug for Cvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug)]
pub struct CreditCardPayment {
    card_number: String,
    cardholder: String,
    expiration: NaiveDate,
    cvv: Cvv,
    brand: CardBrand,
    authorization_code: Option<String>,
}

impl CreditCardPayment {
    /// Spaces and dashes in `card_number` are ignored.
    pub fn new(
        card_number: &str,
        cardholder: impl Into<String>,
        expiration: NaiveDate,
        cvv: impl Into<String>,
    ) -> Self {
        let card_number: String = card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let brand = CardBrand::detect(&card_number);

        Self {
            card_number,
            cardholder: cardholder.into(),
            expiration,
            cvv: Cvv(cvv.into()),
            brand,
            authorization_code: None,
        }
    }

    pub fn cardholder(&self) -> &str {
        &self.cardholder
    }

    pub fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    pub fn brand(&self) -> CardBrand {
        self.brand
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.authorization_code.as_deref()
    }

    /// Shows only the last four digits.
    pub fn masked_card_number(&self) -> String {
        // Unvalidated numbers may hold multi-byte characters.
        let len = self.card_number.chars().count();
        if len < 4 {
            return "*".repeat(len);
        }
        let last4: String = self.card_number.chars().skip(len - 4).collect();
        format!("**** **** **** {last4}")
    }

    // No Luhn checksum: only length and digits are checked.
    pub(crate) fn check(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let digits = self.card_number.len();
        if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits)
            || !self.card_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidCardNumber);
        }
        if self.expiration < today {
            return Err(ValidationError::CardExpired(self.expiration));
        }
        if self.cvv.0.chars().count() != CVV_LENGTH {
            return Err(ValidationError::InvalidCvv);
        }
        if self.cardholder.trim().is_empty() {
            return Err(ValidationError::MissingCardholder);
        }
        Ok(())
    }

    /// Simulated issuer authorization; always approves.
    pub(crate) fn authorize(&mut self, narrator: &Narrator<'_>) -> StepOutcome {
        let serial: String = narrator
            .transaction_id()
            .as_str()
            .trim_start_matches("TXN-")
            .chars()
            .take(6)
            .collect();
        let code = format!("AUTH-{serial}");

        narrator.emit(PaymentEvent::Authorized {
            reference: code.clone(),
        });
        self.authorization_code = Some(code);
        StepOutcome::Completed
    }

    pub(crate) fn describe(&self) -> String {
        let mut out = format!(
            "Card: {} ({})\nCardholder: {}\nExpires: {}",
            self.masked_card_number(),
            self.brand,
            self.cardholder,
            self.expiration.format("%m/%Y"),
        );
        if let Some(code) = &self.authorization_code {
            out.push_str(&format!("\nAuthorization: {code}"));
        }
        out
    }
}

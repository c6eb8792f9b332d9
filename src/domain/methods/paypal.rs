use super::{Narrator, StepOutcome};
use crate::domain::events::PaymentEvent;
use crate::error::{PaymentError, ValidationError};
use crate::policy::PaymentPolicy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    #[default]
    Balance,
    BankAccount,
    Card,
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FundingSource::Balance => "PayPal balance",
            FundingSource::BankAccount => "bank account",
            FundingSource::Card => "linked card",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct PayPalPayment {
    email: String,
    funding_source: FundingSource,
    authorization_token: Option<String>,
}

impl PayPalPayment {
    pub fn new(email: impl Into<String>, funding_source: FundingSource) -> Result<Self, PaymentError> {
        let email = email.into();
        if !email.contains('@') {
            return Err(PaymentError::InvalidEmail(email));
        }
        Ok(Self {
            email,
            funding_source,
            authorization_token: None,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn funding_source(&self) -> FundingSource {
        self.funding_source
    }

    pub fn authorization_token(&self) -> Option<&str> {
        self.authorization_token.as_deref()
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization_token.is_some()
    }

    pub(crate) fn check(&self, amount: Decimal, policy: &PaymentPolicy) -> Result<(), ValidationError> {
        if !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        if amount > policy.paypal_transaction_limit {
            return Err(ValidationError::LimitExceeded {
                amount,
                limit: policy.paypal_transaction_limit,
            });
        }
        Ok(())
    }

    /// Simulated OAuth round-trip; always grants a token.
    pub(crate) fn authorize(&mut self, narrator: &Narrator<'_>) -> StepOutcome {
        let serial = Uuid::new_v4().simple().to_string().to_uppercase();
        let token = format!("EC-{}", &serial[..17]);

        narrator.emit(PaymentEvent::Authorized {
            reference: token.clone(),
        });
        self.authorization_token = Some(token);
        StepOutcome::Completed
    }

    pub(crate) fn describe(&self) -> String {
        let mut out = format!("PayPal account: {}\nFunded by: {}", self.email, self.funding_source);
        match &self.authorization_token {
            Some(token) => out.push_str(&format!("\nAuthorization token: {token}")),
            None => out.push_str("\nNot authorized"),
        }
        out
    }
}

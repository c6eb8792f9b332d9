use super::{Narrator, StepOutcome};
use crate::domain::events::PaymentEvent;
use crate::domain::money::to_cents;
use crate::error::{PaymentError, ValidationError};
use crate::policy::PaymentPolicy;
use rust_decimal::Decimal;
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Bills and coins used when counting out change, in cents, largest first.
const DENOMINATION_CENTS: [i64; 10] = [10000, 5000, 2000, 1000, 500, 100, 25, 10, 5, 1];

/// A count of one bill or coin value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denomination {
    pub value: Decimal,
    pub count: u128,
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.value >= Decimal::ONE { "bill" } else { "coin" };
        write!(f, "{} x ${:.2} {kind}", self.count, self.value)
    }
}

/// Greedy decomposition of `change` (rounded to cents) into bills and coins.
///
/// Works on whole cents so that any change a `Decimal` can hold is counted
/// exactly.
pub fn change_breakdown(change: Decimal) -> Vec<Denomination> {
    let change = to_cents(change);
    // A 96-bit mantissa scaled up to cents still fits in 128 bits.
    let scale_up = 10u128.pow(2u32.saturating_sub(change.scale()));
    let mut remaining = change.mantissa().unsigned_abs() * scale_up;
    let mut breakdown = Vec::new();

    for cents in DENOMINATION_CENTS {
        let unit = u128::from(cents.unsigned_abs());
        let count = remaining / unit;
        if count == 0 {
            continue;
        }
        remaining %= unit;
        breakdown.push(Denomination {
            value: Decimal::new(cents, 2),
            count,
        });
    }
    breakdown
}

#[derive(Debug)]
pub struct CashPayment {
    currency: String,
    amount_tendered: Decimal,
    change: Decimal,
    verified: bool,
    change_breakdown: Vec<Denomination>,
}

impl CashPayment {
    pub fn new(
        amount_due: Decimal,
        amount_tendered: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        if amount_tendered < amount_due {
            return Err(PaymentError::InsufficientTender {
                due: amount_due,
                tendered: amount_tendered,
            });
        }
        Ok(Self {
            currency: currency.into(),
            amount_tendered,
            change: amount_tendered - amount_due,
            verified: false,
            change_breakdown: Vec::new(),
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount_tendered(&self) -> Decimal {
        self.amount_tendered
    }

    pub fn change(&self) -> Decimal {
        self.change
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Empty until the payment has been processed.
    pub fn change_breakdown(&self) -> &[Denomination] {
        &self.change_breakdown
    }

    pub(crate) fn check(&self, amount: Decimal, policy: &PaymentPolicy) -> Result<(), ValidationError> {
        if self.amount_tendered < amount {
            return Err(ValidationError::InsufficientTender {
                due: amount,
                tendered: self.amount_tendered,
            });
        }
        if amount > policy.cash_transaction_limit {
            return Err(ValidationError::LimitExceeded {
                amount,
                limit: policy.cash_transaction_limit,
            });
        }
        Ok(())
    }

    /// Counterfeit check (always passes) followed by counting out change.
    pub(crate) fn accept(&mut self, narrator: &Narrator<'_>) -> StepOutcome {
        self.verified = true;
        narrator.emit(PaymentEvent::CounterfeitCheckPassed);

        if self.change > Decimal::ZERO {
            self.change_breakdown = change_breakdown(self.change);
            narrator.emit(PaymentEvent::ChangeDispensed {
                change: self.change,
                breakdown: self.change_breakdown.clone(),
            });
        }
        StepOutcome::Completed
    }

    pub(crate) fn refund_note(&self, amount: Decimal) -> String {
        format!("{:.2} {} returned in cash immediately", amount, self.currency)
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "Currency: {}\nTendered: {:.2}\nChange: {:.2}\nVerified: {}",
            self.currency,
            self.amount_tendered,
            self.change,
            if self.verified { "yes" } else { "no" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::TransactionId;
    use crate::infrastructure::sinks::RecordingSink;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tender_must_cover_amount() {
        assert!(matches!(
            CashPayment::new(dec!(100), dec!(50), DEFAULT_CURRENCY),
            Err(PaymentError::InsufficientTender { .. })
        ));
        let exact = CashPayment::new(dec!(100), dec!(100), DEFAULT_CURRENCY).unwrap();
        assert_eq!(exact.change(), Decimal::ZERO);
    }

    #[test]
    fn test_change_breakdown() {
        let breakdown = change_breakdown(dec!(37.41));
        let expected = vec![
            Denomination { value: dec!(20), count: 1 },
            Denomination { value: dec!(10), count: 1 },
            Denomination { value: dec!(5), count: 1 },
            Denomination { value: dec!(1), count: 2 },
            Denomination { value: dec!(0.25), count: 1 },
            Denomination { value: dec!(0.10), count: 1 },
            Denomination { value: dec!(0.05), count: 1 },
            Denomination { value: dec!(0.01), count: 1 },
        ];
        assert_eq!(breakdown, expected);
    }

    #[test]
    fn test_huge_change_is_counted_exactly() {
        assert_eq!(
            change_breakdown(dec!(1000000000000)),
            vec![Denomination { value: dec!(100), count: 10_000_000_000 }]
        );

        // 79228162514264337593543950335 dollars.
        assert_eq!(
            change_breakdown(Decimal::MAX),
            vec![
                Denomination { value: dec!(100), count: 792_281_625_142_643_375_935_439_503 },
                Denomination { value: dec!(20), count: 1 },
                Denomination { value: dec!(10), count: 1 },
                Denomination { value: dec!(5), count: 1 },
            ]
        );
    }

    #[test]
    fn test_sub_cent_change_rounds_first() {
        assert_eq!(
            change_breakdown(dec!(0.005)),
            vec![Denomination { value: dec!(0.01), count: 1 }]
        );
        assert!(change_breakdown(dec!(0.004)).is_empty());
    }

    #[test]
    fn test_cash_limit() {
        let cash = CashPayment::new(dec!(12000), dec!(12000), DEFAULT_CURRENCY).unwrap();
        assert!(matches!(
            cash.check(dec!(12000), &PaymentPolicy::default()),
            Err(ValidationError::LimitExceeded { .. })
        ));
    }

    #[test]
    fn test_accept_verifies_and_counts_change() {
        let mut cash = CashPayment::new(dec!(100), dec!(120), DEFAULT_CURRENCY).unwrap();
        let id = TransactionId::generate();
        let sink = RecordingSink::new();

        assert_eq!(cash.accept(&Narrator::new(&id, &sink)), StepOutcome::Completed);
        assert!(cash.is_verified());
        assert_eq!(
            cash.change_breakdown(),
            &[Denomination { value: dec!(20), count: 1 }]
        );
        assert_eq!(sink.events().len(), 2);
    }
}

use super::{Narrator, StepOutcome};
use crate::domain::events::PaymentEvent;
use crate::error::{PaymentError, ValidationError};
use crate::policy::PaymentPolicy;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

const MIN_ADDRESS_LEN: usize = 26;
const MAX_ADDRESS_LEN: usize = 35;

/// A payment settled on a (simulated) blockchain.
///
/// Processing broadcasts a transaction and then polls for confirmations. If the
/// required number of confirmations is not reached during `process`, the
/// payment stays `Processing` with its transaction already broadcast.
#[derive(Debug)]
pub struct BitcoinPayment {
    wallet_address: String,
    /// USD per BTC.
    exchange_rate: Decimal,
    bitcoin_amount: Decimal,
    confirmations: u32,
    required_confirmations: u32,
    transaction_hash: Option<String>,
    refund_hash: Option<String>,
}

impl BitcoinPayment {
    pub fn new(
        amount_usd: Decimal,
        wallet_address: impl Into<String>,
        exchange_rate: Decimal,
        required_confirmations: u32,
    ) -> Result<Self, PaymentError> {
        let wallet_address = wallet_address.into().trim().to_string();
        if wallet_address.is_empty() {
            return Err(PaymentError::EmptyWalletAddress);
        }
        if exchange_rate <= Decimal::ZERO {
            return Err(PaymentError::InvalidExchangeRate(exchange_rate));
        }
        let bitcoin_amount = amount_usd.checked_div(exchange_rate).ok_or(
            PaymentError::ConversionOverflow {
                amount: amount_usd,
                rate: exchange_rate,
            },
        )?;

        Ok(Self {
            wallet_address,
            exchange_rate,
            bitcoin_amount,
            confirmations: 0,
            required_confirmations,
            transaction_hash: None,
            refund_hash: None,
        })
    }

    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    pub fn bitcoin_amount(&self) -> Decimal {
        self.bitcoin_amount
    }

    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    pub fn required_confirmations(&self) -> u32 {
        self.required_confirmations
    }

    /// Only a broadcast transaction can be confirmed, even when no
    /// confirmations are required.
    pub fn is_confirmed(&self) -> bool {
        self.is_broadcast() && self.confirmations >= self.required_confirmations
    }

    pub fn is_broadcast(&self) -> bool {
        self.transaction_hash.is_some()
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    pub fn refund_hash(&self) -> Option<&str> {
        self.refund_hash.as_deref()
    }

    /// `None` when the result does not fit a `Decimal`.
    ///
    /// Division keeps 28 significant digits, so converting back with
    /// [`convert_to_usd`](Self::convert_to_usd) can differ from the input in
    /// the last digits. A whole-cent input comes back exactly once rounded to
    /// cents.
    pub fn convert_to_bitcoin(&self, usd: Decimal) -> Option<Decimal> {
        usd.checked_div(self.exchange_rate)
    }

    pub fn convert_to_usd(&self, btc: Decimal) -> Option<Decimal> {
        btc.checked_mul(self.exchange_rate)
    }

    pub(crate) fn set_required_confirmations(&mut self, required: u32) {
        self.required_confirmations = required;
    }

    pub(crate) fn check(&self) -> Result<(), ValidationError> {
        let len = self.wallet_address.chars().count();
        if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&len) {
            return Err(ValidationError::InvalidWalletAddress(len));
        }
        if self.exchange_rate <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveRate);
        }
        if self.bitcoin_amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveBitcoinAmount);
        }
        Ok(())
    }

    pub(crate) fn broadcast_and_confirm(
        &mut self,
        policy: &PaymentPolicy,
        narrator: &Narrator<'_>,
    ) -> StepOutcome {
        if self.transaction_hash.is_none() {
            let hash = transaction_hash(&[
                narrator.transaction_id().as_str(),
                &self.wallet_address,
                &self.bitcoin_amount.to_string(),
            ]);
            narrator.emit(PaymentEvent::Broadcast { hash: hash.clone() });
            self.transaction_hash = Some(hash);
        }
        self.poll_confirmations(policy.confirmation_polls, narrator)
    }

    /// Each poll of the simulated network adds one confirmation.
    pub(crate) fn poll_confirmations(&mut self, polls: u32, narrator: &Narrator<'_>) -> StepOutcome {
        for _ in 0..polls {
            if self.is_confirmed() {
                break;
            }
            self.confirmations += 1;
            narrator.emit(PaymentEvent::Confirmation {
                count: self.confirmations,
                required: self.required_confirmations,
            });
        }

        if self.is_confirmed() {
            StepOutcome::Completed
        } else {
            narrator.emit(PaymentEvent::AwaitingConfirmations {
                count: self.confirmations,
                required: self.required_confirmations,
            });
            StepOutcome::AwaitingConfirmations
        }
    }

    /// A broadcast transaction cannot be reversed; the refund goes out as a
    /// new transaction to the payer's wallet.
    pub(crate) fn send_refund(&mut self, amount_usd: Decimal) -> String {
        // The refund never exceeds the paid amount, which converted at construction.
        let btc = self
            .convert_to_bitcoin(amount_usd)
            .unwrap_or(self.bitcoin_amount);
        let hash = transaction_hash(&[
            "refund",
            self.transaction_hash.as_deref().unwrap_or_default(),
            &self.wallet_address,
            &btc.to_string(),
        ]);
        let note = format!(
            "{:.8} BTC sent to {} in new transaction {}",
            btc, self.wallet_address, hash
        );
        self.refund_hash = Some(hash);
        note
    }

    pub(crate) fn describe(&self) -> String {
        let mut out = format!(
            "Wallet: {}\nBTC amount: {:.8} @ ${:.2}/BTC\nConfirmations: {}/{}",
            self.wallet_address,
            self.bitcoin_amount,
            self.exchange_rate,
            self.confirmations,
            self.required_confirmations,
        );
        if let Some(hash) = &self.transaction_hash {
            out.push_str(&format!("\nTransaction: {hash}"));
        }
        if let Some(hash) = &self.refund_hash {
            out.push_str(&format!("\nRefund transaction: {hash}"));
        }
        out
    }
}

fn transaction_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{TransactionId, to_cents};
    use crate::infrastructure::sinks::RecordingSink;
    use rust_decimal_macros::dec;

    const WALLET: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";

    #[test]
    fn test_bitcoin_amount() {
        let btc = BitcoinPayment::new(dec!(100), WALLET, dec!(50000), 3).unwrap();
        assert_eq!(btc.bitcoin_amount(), dec!(0.002));
    }

    #[test]
    fn test_conversion_round_trip() {
        let btc = BitcoinPayment::new(dec!(100), WALLET, dec!(50000), 3).unwrap();
        for usd in [dec!(1), dec!(99.99), dec!(12345.67), dec!(0.01)] {
            let back = btc.convert_to_bitcoin(usd).and_then(|b| btc.convert_to_usd(b));
            assert_eq!(back, Some(usd));
        }
    }

    #[test]
    fn test_conversion_round_trip_with_inexact_rate() {
        let btc = BitcoinPayment::new(dec!(100), WALLET, dec!(43210.57), 3).unwrap();
        for usd in [dec!(1), dec!(100), dec!(99.99), dec!(12345.67), dec!(0.01)] {
            let back = btc
                .convert_to_bitcoin(usd)
                .and_then(|b| btc.convert_to_usd(b))
                .unwrap();
            assert!((back - usd).abs() < dec!(0.000000000001), "{usd} came back as {back}");
            assert_eq!(to_cents(back), usd);
        }
    }

    #[test]
    fn test_conversion_overflow_is_an_error() {
        assert!(matches!(
            BitcoinPayment::new(dec!(10000000000000000000000000), WALLET, dec!(0.0001), 3),
            Err(PaymentError::ConversionOverflow { .. })
        ));

        let btc = BitcoinPayment::new(dec!(100), WALLET, dec!(0.0001), 3).unwrap();
        assert_eq!(btc.bitcoin_amount(), dec!(1000000));
        assert_eq!(btc.convert_to_bitcoin(Decimal::MAX), None);
        assert_eq!(btc.convert_to_usd(Decimal::MAX), None);
    }

    #[test]
    fn test_zero_required_confirmations_needs_broadcast() {
        let mut btc = BitcoinPayment::new(dec!(100), WALLET, dec!(50000), 0).unwrap();
        assert!(!btc.is_confirmed());

        let id = TransactionId::generate();
        let sink = RecordingSink::new();
        let outcome = btc.broadcast_and_confirm(&PaymentPolicy::default(), &Narrator::new(&id, &sink));
        assert_eq!(outcome, StepOutcome::Completed);
        assert!(btc.is_confirmed());
        assert_eq!(btc.confirmations(), 0);
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            BitcoinPayment::new(dec!(100), WALLET, dec!(0), 3),
            Err(PaymentError::InvalidExchangeRate(_))
        ));
        assert!(matches!(
            BitcoinPayment::new(dec!(100), "   ", dec!(50000), 3),
            Err(PaymentError::EmptyWalletAddress)
        ));
    }

    #[test]
    fn test_address_length() {
        let short = BitcoinPayment::new(dec!(100), "1BvBMSEY", dec!(50000), 3).unwrap();
        assert_eq!(short.check(), Err(ValidationError::InvalidWalletAddress(8)));

        let long = BitcoinPayment::new(dec!(100), "1".repeat(36), dec!(50000), 3).unwrap();
        assert_eq!(long.check(), Err(ValidationError::InvalidWalletAddress(36)));

        let ok = BitcoinPayment::new(dec!(100), "1".repeat(26), dec!(50000), 3).unwrap();
        assert!(ok.check().is_ok());
    }

    #[test]
    fn test_partial_confirmation() {
        let mut btc = BitcoinPayment::new(dec!(100), WALLET, dec!(50000), 6).unwrap();
        let id = TransactionId::generate();
        let sink = RecordingSink::new();
        let narrator = Narrator::new(&id, &sink);

        let outcome = btc.broadcast_and_confirm(&PaymentPolicy::default(), &narrator);
        assert_eq!(outcome, StepOutcome::AwaitingConfirmations);
        assert!(btc.is_broadcast());
        assert_eq!(btc.confirmations(), 3);
        assert!(!btc.is_confirmed());

        assert_eq!(btc.poll_confirmations(3, &narrator), StepOutcome::Completed);
        assert!(btc.is_confirmed());
        assert_eq!(btc.confirmations(), 6);
    }

    #[test]
    fn test_refund_is_new_transaction() {
        let mut btc = BitcoinPayment::new(dec!(100), WALLET, dec!(50000), 3).unwrap();
        let id = TransactionId::generate();
        let sink = RecordingSink::new();
        btc.broadcast_and_confirm(&PaymentPolicy::default(), &Narrator::new(&id, &sink));

        let note = btc.send_refund(dec!(50));
        let refund_hash = btc.refund_hash().unwrap();
        assert_ne!(Some(refund_hash), btc.transaction_hash());
        assert_eq!(refund_hash.len(), 64);
        assert!(note.contains("0.00100000 BTC"));
    }
}

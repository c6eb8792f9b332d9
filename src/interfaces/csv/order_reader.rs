use crate::application::order::PaymentOrder;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads payment orders from a CSV source.
///
/// Whitespace around fields is trimmed and rows may omit trailing columns
/// that their payment method does not use.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes orders; a malformed row yields an error without
    /// ending the stream.
    pub fn orders(self) -> impl Iterator<Item = Result<PaymentOrder>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::order::MethodKind;
    use rust_decimal_macros::dec;

    const HEADER: &str =
        "method,amount,card_number,cardholder,expiration,cvv,email,funding,tendered,currency,wallet,rate";

    #[test]
    fn test_reader_mixed_methods() {
        let data = format!(
            "{HEADER}\n\
             cash, 100, , , , , , , 120\n\
             paypal, 15.5, , , , , ada@example.com, card\n\
             bitcoin, 100, , , , , , , , , 1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2, 50000"
        );
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<PaymentOrder>> = reader.orders().collect();

        assert_eq!(results.len(), 3);
        let cash = results[0].as_ref().unwrap();
        assert_eq!(cash.method, MethodKind::Cash);
        assert_eq!(cash.tendered, Some(dec!(120)));

        let btc = results[2].as_ref().unwrap();
        assert_eq!(btc.rate, Some(dec!(50000)));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\ncheque, 1\ncash, not_a_number\ncash, 5");
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<PaymentOrder>> = reader.orders().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}

use crate::domain::payment::PaymentSummary;
use crate::error::Result;
use std::io::Write;

/// Writes payment summaries as CSV with a header row.
pub struct SummaryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_summaries(&mut self, summaries: impl IntoIterator<Item = PaymentSummary>) -> Result<()> {
        for summary in summaries {
            self.writer.serialize(summary)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes one JSON object per line.
pub fn write_json_lines<W: Write>(
    mut sink: W,
    summaries: impl IntoIterator<Item = PaymentSummary>,
) -> Result<()> {
    for summary in summaries {
        serde_json::to_writer(&mut sink, &summary)?;
        writeln!(sink)?;
    }
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::Payment;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_output() {
        let payment = Payment::cash(dec!(100), dec!(120)).unwrap();
        let mut out = Vec::new();
        SummaryWriter::new(&mut out)
            .write_summaries([payment.summary()])
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("transaction_id,method,amount,fee,total,status,payment_date")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(payment.transaction_id().as_str()));
        assert!(row.contains(",Cash,100.00,0.00,100.00,Pending,"));
    }

    #[test]
    fn test_json_lines_output() {
        let a = Payment::cash(dec!(1), dec!(1)).unwrap();
        let b = Payment::cash(dec!(2), dec!(2)).unwrap();
        let mut out = Vec::new();
        write_json_lines(&mut out, [a.summary(), b.summary()]).unwrap();

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["amount"], "2.00");
    }
}

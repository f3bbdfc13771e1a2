use crate::domain::payment::PaymentRecord;
use crate::error::Result;
use std::io::Write;

/// Writes payment records as CSV, one row per completed transfer.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a, I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        for record in payments {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

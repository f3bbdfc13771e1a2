use crate::domain::ids::{AccountId, Amount, AssetId};
use crate::domain::ledger::BalanceEntry;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    account: &'a AccountId,
    asset: &'a AssetId,
    balance: Amount,
}

/// Writes `account,asset,balance` rows.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances<I>(&mut self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = BalanceEntry>,
    {
        for entry in balances {
            self.writer.serialize(BalanceRow {
                account: &entry.account,
                asset: &entry.asset,
                balance: entry.amount,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

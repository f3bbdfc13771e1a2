use super::error::LedgerError;
use super::ids::{AccountId, Amount, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sequential identifier of a completed payment, starting at 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PaymentId(pub u64);

impl PaymentId {
    /// The following id, or `None` once `u64::MAX` is reached.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Only terminal state a payment can be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
        }
    }
}

/// Source of payment timestamps, in unix seconds.
pub trait TimestampSource: Send + Sync {
    fn now(&self) -> u64;
}

impl<F> TimestampSource for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn now(&self) -> u64 {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub sender: AccountId,
    pub recipient: AccountId,
    pub amount: Amount,
    pub asset: AssetId,
    pub status: PaymentStatus,
    pub timestamp: u64,
}

/// Append-only record of completed transfers.
///
/// Records are never mutated or removed and ids are gapless. The log is
/// unbounded; `page` is the hook for callers that need to walk it in chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLog {
    records: BTreeMap<PaymentId, PaymentRecord>,
    next_id: PaymentId,
}

impl PaymentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> PaymentId {
        self.next_id
    }

    pub fn append(
        &mut self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
        clock: &dyn TimestampSource,
    ) -> PaymentId {
        let record = self.prepare(sender, recipient, amount, asset, clock);
        let id = record.id;
        self.insert(record);
        id
    }

    /// Builds the record the next `append` would store, without storing it.
    pub fn prepare(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
        clock: &dyn TimestampSource,
    ) -> PaymentRecord {
        PaymentRecord {
            id: self.next_id,
            sender,
            recipient,
            amount,
            asset,
            status: PaymentStatus::Completed,
            timestamp: clock.now(),
        }
    }

    pub fn get(&self, id: PaymentId) -> Result<PaymentRecord, LedgerError> {
        self.records.get(&id).cloned().ok_or(LedgerError::NotFound)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaymentRecord> {
        self.records.values()
    }

    /// Up to `limit` records starting at `start`, in id order.
    pub fn page(&self, start: PaymentId, limit: usize) -> Vec<PaymentRecord> {
        self.records
            .range(start..)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect()
    }

    // Records arrive either from `append` or from a persisted snapshot; in both
    // cases the counter must stay past the highest id seen. At `u64::MAX` the
    // counter saturates.
    pub(super) fn insert(&mut self, record: PaymentRecord) {
        if record.id >= self.next_id {
            self.next_id = record.id.next().unwrap_or(PaymentId(u64::MAX));
        }
        self.records.insert(record.id, record);
    }
}

use super::ledger::{Changeset, LedgerSnapshot};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence boundary for a ledger.
///
/// `commit` must write a changeset all-or-nothing; the service applies it in
/// memory only after `commit` returns `Ok`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Full state, or `None` if nothing was ever committed.
    async fn load(&self) -> Result<Option<LedgerSnapshot>>;
    async fn commit(&self, changes: &Changeset) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type LedgerStoreFactory = Box<dyn Fn() -> LedgerStoreBox + Send + Sync>;

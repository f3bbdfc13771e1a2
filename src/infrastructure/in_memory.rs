use crate::domain::ledger::{Changeset, Ledger, LedgerSnapshot};
use crate::domain::ports::LedgerStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger store.
///
/// Uses `Arc<RwLock<..>>` so clones share the same state; a clone handed to a
/// second engine sees everything the first one committed.
/// Ideal for testing or one-shot batches where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledger: Arc<RwLock<Option<Ledger>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self) -> Result<Option<LedgerSnapshot>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.as_ref().map(Ledger::snapshot))
    }

    async fn commit(&self, changes: &Changeset) -> Result<()> {
        let mut guard = self.ledger.write().await;
        if guard.is_none() {
            let administrator = changes.administrator.clone().ok_or_else(|| {
                Error::Internal(Box::new(std::io::Error::other(
                    "first commit must name an administrator",
                )))
            })?;
            *guard = Some(Ledger::new(administrator));
        }
        if let Some(ledger) = guard.as_mut() {
            ledger.apply(changes.clone());
        }
        Ok(())
    }
}

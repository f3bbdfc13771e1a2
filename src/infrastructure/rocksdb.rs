use crate::domain::ids::{AccountId, AssetId};
use crate::domain::ledger::{BalanceEntry, Changeset, LedgerSnapshot};
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::LedgerStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for registry singletons such as the administrator.
pub const CF_META: &str = "meta";
/// Column Family holding one key per eligible asset.
pub const CF_ASSETS: &str = "assets";
/// Column Family for balances, keyed by asset bytes followed by account id.
pub const CF_BALANCES: &str = "balances";
/// Column Family for payment records, keyed by big-endian id.
pub const CF_PAYMENTS: &str = "payments";

const KEY_ADMINISTRATOR: &[u8] = b"administrator";

/// A persistent ledger store backed by RocksDB.
///
/// Registry, balances and payments live in separate Column Families. Every
/// changeset is written with a single `WriteBatch`, so a crash never leaves a
/// debit without its credit or a balance change without its payment record.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all ledger column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_META, CF_ASSETS, CF_BALANCES, CF_PAYMENTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            Error::Internal(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn values<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn balance_key(account: &AccountId, asset: &AssetId) -> Vec<u8> {
    let mut key = Vec::with_capacity(asset.as_bytes().len() + account.as_str().len());
    key.extend_from_slice(asset.as_bytes());
    key.extend_from_slice(account.as_str().as_bytes());
    key
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn load(&self) -> Result<Option<LedgerSnapshot>> {
        let Some(bytes) = self.db.get_cf(self.cf(CF_META)?, KEY_ADMINISTRATOR)? else {
            return Ok(None);
        };
        let administrator: AccountId = serde_json::from_slice(&bytes)?;

        let mut eligible_assets = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_ASSETS)?, IteratorMode::Start) {
            let (key, _value) = item?;
            let bytes: [u8; 32] = key[..].try_into().map_err(|_| {
                Error::Internal(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "asset key is not 32 bytes",
                )))
            })?;
            eligible_assets.push(AssetId::from_bytes(bytes));
        }

        let balances: Vec<BalanceEntry> = self.values(CF_BALANCES)?;
        let payments: Vec<PaymentRecord> = self.values(CF_PAYMENTS)?;

        Ok(Some(LedgerSnapshot {
            administrator,
            eligible_assets,
            balances,
            payments,
        }))
    }

    async fn commit(&self, changes: &Changeset) -> Result<()> {
        let mut batch = WriteBatch::default();

        if let Some(administrator) = &changes.administrator {
            batch.put_cf(
                self.cf(CF_META)?,
                KEY_ADMINISTRATOR,
                serde_json::to_vec(administrator)?,
            );
        }
        if let Some((asset, eligible)) = &changes.eligibility {
            let cf = self.cf(CF_ASSETS)?;
            if *eligible {
                batch.put_cf(cf, asset.as_bytes(), b"");
            } else {
                batch.delete_cf(cf, asset.as_bytes());
            }
        }
        for entry in &changes.balances {
            batch.put_cf(
                self.cf(CF_BALANCES)?,
                balance_key(&entry.account, &entry.asset),
                serde_json::to_vec(entry)?,
            );
        }
        if let Some(record) = &changes.payment {
            batch.put_cf(
                self.cf(CF_PAYMENTS)?,
                record.id.0.to_be_bytes(),
                serde_json::to_vec(record)?,
            );
        }

        self.db.write(batch)?;

        Ok(())
    }
}

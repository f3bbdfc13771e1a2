use super::error::LedgerError;
use super::ids::{AccountId, AssetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Administrator identity and the set of assets approved for ledger use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    administrator: AccountId,
    eligible_assets: BTreeSet<AssetId>,
}

impl Registry {
    pub fn new(administrator: AccountId) -> Self {
        Self {
            administrator,
            eligible_assets: BTreeSet::new(),
        }
    }

    pub fn administrator(&self) -> &AccountId {
        &self.administrator
    }

    /// Fails with `NotAuthorized` unless `caller` is the current administrator.
    pub fn authorize(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if *caller == self.administrator {
            Ok(())
        } else {
            Err(LedgerError::NotAuthorized)
        }
    }

    /// Adding an asset that is already eligible is a no-op success.
    pub fn add_eligible_asset(
        &mut self,
        caller: &AccountId,
        asset: AssetId,
    ) -> Result<(), LedgerError> {
        self.authorize(caller)?;
        self.eligible_assets.insert(asset);
        Ok(())
    }

    /// Existing balances of a removed asset are kept; only future
    /// eligibility checks are affected.
    pub fn remove_eligible_asset(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
    ) -> Result<(), LedgerError> {
        self.authorize(caller)?;
        self.eligible_assets.remove(asset);
        Ok(())
    }

    /// Single-step hand-off: takes effect immediately and `new_admin` may equal
    /// the current administrator.
    pub fn transfer_administrator(
        &mut self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), LedgerError> {
        self.authorize(caller)?;
        self.administrator = new_admin;
        Ok(())
    }

    pub fn is_eligible(&self, asset: &AssetId) -> bool {
        self.eligible_assets.contains(asset)
    }

    pub fn eligible_assets(&self) -> impl Iterator<Item = &AssetId> {
        self.eligible_assets.iter()
    }

    // Unchecked setters for changesets that were authorized when planned.
    pub(super) fn set_administrator(&mut self, administrator: AccountId) {
        self.administrator = administrator;
    }

    pub(super) fn set_eligible(&mut self, asset: AssetId, eligible: bool) {
        if eligible {
            self.eligible_assets.insert(asset);
        } else {
            self.eligible_assets.remove(&asset);
        }
    }
}

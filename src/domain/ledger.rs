use super::error::LedgerError;
use super::ids::{AccountId, Amount, AssetId};
use super::operation::{Operation, Outcome};
use super::payment::{PaymentId, PaymentLog, PaymentRecord, TimestampSource};
use super::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (account, asset) balance, as persisted and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub account: AccountId,
    pub asset: AssetId,
    pub amount: Amount,
}

/// Validated effect of one operation, not yet applied.
///
/// Balances carry their new absolute values, so applying a changeset twice
/// leaves the ledger where applying it once did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    pub administrator: Option<AccountId>,
    pub eligibility: Option<(AssetId, bool)>,
    pub balances: Vec<BalanceEntry>,
    pub payment: Option<PaymentRecord>,
}

impl Changeset {
    fn outcome(&self) -> Outcome {
        match &self.payment {
            Some(record) => Outcome::Transferred(record.id),
            None => Outcome::Applied,
        }
    }
}

/// Full serializable state, used to rebuild a ledger from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub administrator: AccountId,
    pub eligible_assets: Vec<AssetId>,
    pub balances: Vec<BalanceEntry>,
    pub payments: Vec<PaymentRecord>,
}

/// Per-(account, asset) balances, gated by a [`Registry`] and journaled in a
/// [`PaymentLog`].
///
/// Every mutation goes through `plan` then `apply`: planning validates and
/// computes the new values without touching state, applying cannot fail. A
/// rejected operation therefore leaves balances, registry and log untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    registry: Registry,
    balances: BTreeMap<(AccountId, AssetId), Amount>,
    payments: PaymentLog,
}

impl Ledger {
    pub fn new(administrator: AccountId) -> Self {
        Self {
            registry: Registry::new(administrator),
            balances: BTreeMap::new(),
            payments: PaymentLog::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn payments(&self) -> &PaymentLog {
        &self.payments
    }

    pub fn add_eligible_asset(
        &mut self,
        caller: &AccountId,
        asset: AssetId,
    ) -> Result<(), LedgerError> {
        self.registry.add_eligible_asset(caller, asset)
    }

    pub fn remove_eligible_asset(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
    ) -> Result<(), LedgerError> {
        self.registry.remove_eligible_asset(caller, asset)
    }

    pub fn transfer_administrator(
        &mut self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), LedgerError> {
        self.registry.transfer_administrator(caller, new_admin)
    }

    /// Credits `amount` of newly minted `asset` to `account`.
    pub fn deposit(
        &mut self,
        account: AccountId,
        amount: Amount,
        asset: AssetId,
    ) -> Result<(), LedgerError> {
        let changes = self.plan_deposit(account, amount, asset)?;
        self.apply(changes);
        Ok(())
    }

    /// Moves `amount` from `sender` to `recipient` and records the payment.
    pub fn transfer(
        &mut self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
        clock: &dyn TimestampSource,
    ) -> Result<PaymentId, LedgerError> {
        let changes = self.plan_transfer(sender, recipient, amount, asset, clock)?;
        let id = self.payments.next_id();
        self.apply(changes);
        Ok(id)
    }

    pub fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(account.clone(), *asset))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn payment(&self, id: PaymentId) -> Result<PaymentRecord, LedgerError> {
        self.payments.get(id)
    }

    /// Sum of every account's balance of `asset`, or `None` past `u128::MAX`.
    pub fn total_supply(&self, asset: &AssetId) -> Option<Amount> {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .try_fold(Amount::ZERO, |sum, (_, amount)| sum.checked_add(*amount))
    }

    /// Balances ordered by account, then asset.
    pub fn balances(&self) -> impl Iterator<Item = BalanceEntry> + '_ {
        self.balances
            .iter()
            .map(|((account, asset), amount)| BalanceEntry {
                account: account.clone(),
                asset: *asset,
                amount: *amount,
            })
    }

    pub fn execute(
        &mut self,
        operation: Operation,
        clock: &dyn TimestampSource,
    ) -> Result<Outcome, LedgerError> {
        let changes = self.plan(operation, clock)?;
        Ok(self.apply(changes))
    }

    /// Validates `operation` against the current state and returns its effect.
    pub fn plan(
        &self,
        operation: Operation,
        clock: &dyn TimestampSource,
    ) -> Result<Changeset, LedgerError> {
        match operation {
            Operation::AddEligibleAsset { caller, asset } => {
                self.registry.authorize(&caller)?;
                Ok(Changeset {
                    eligibility: Some((asset, true)),
                    ..Default::default()
                })
            }
            Operation::RemoveEligibleAsset { caller, asset } => {
                self.registry.authorize(&caller)?;
                Ok(Changeset {
                    eligibility: Some((asset, false)),
                    ..Default::default()
                })
            }
            Operation::TransferAdministrator { caller, new_admin } => {
                self.registry.authorize(&caller)?;
                Ok(Changeset {
                    administrator: Some(new_admin),
                    ..Default::default()
                })
            }
            Operation::Deposit {
                account,
                amount,
                asset,
            } => self.plan_deposit(account, amount, asset),
            Operation::Transfer {
                sender,
                recipient,
                amount,
                asset,
            } => self.plan_transfer(sender, recipient, amount, asset, clock),
        }
    }

    /// Applies a planned changeset. Plans must be applied in the order they
    /// were made, against the state they were planned on.
    pub fn apply(&mut self, changes: Changeset) -> Outcome {
        let outcome = changes.outcome();

        if let Some(administrator) = changes.administrator {
            self.registry.set_administrator(administrator);
        }
        if let Some((asset, eligible)) = changes.eligibility {
            self.registry.set_eligible(asset, eligible);
        }
        for entry in changes.balances {
            self.balances
                .insert((entry.account, entry.asset), entry.amount);
        }
        if let Some(record) = changes.payment {
            self.payments.insert(record);
        }

        outcome
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            administrator: self.registry.administrator().clone(),
            eligible_assets: self.registry.eligible_assets().copied().collect(),
            balances: self.balances().collect(),
            payments: self.payments.iter().cloned().collect(),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut ledger = Self::new(snapshot.administrator);
        for asset in snapshot.eligible_assets {
            ledger.registry.set_eligible(asset, true);
        }
        for entry in snapshot.balances {
            ledger
                .balances
                .insert((entry.account, entry.asset), entry.amount);
        }
        for record in snapshot.payments {
            ledger.payments.insert(record);
        }
        ledger
    }

    fn ensure_eligible(&self, asset: &AssetId) -> Result<(), LedgerError> {
        if self.registry.is_eligible(asset) {
            Ok(())
        } else {
            Err(LedgerError::IneligibleAsset)
        }
    }

    fn plan_deposit(
        &self,
        account: AccountId,
        amount: Amount,
        asset: AssetId,
    ) -> Result<Changeset, LedgerError> {
        self.ensure_eligible(&asset)?;
        if amount.is_zero() {
            return Ok(Changeset::default());
        }
        let balance = self
            .balance_of(&account, &asset)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        Ok(Changeset {
            balances: vec![BalanceEntry {
                account,
                asset,
                amount: balance,
            }],
            ..Default::default()
        })
    }

    fn plan_transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
        clock: &dyn TimestampSource,
    ) -> Result<Changeset, LedgerError> {
        self.ensure_eligible(&asset)?;

        let sender_balance = self.balance_of(&sender, &asset);
        let debited = sender_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;

        let balances = if sender == recipient || amount.is_zero() {
            // Balance-neutral, but the payment is still recorded.
            Vec::new()
        } else {
            let credited = self
                .balance_of(&recipient, &asset)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow)?;
            vec![
                BalanceEntry {
                    account: sender.clone(),
                    asset,
                    amount: debited,
                },
                BalanceEntry {
                    account: recipient.clone(),
                    asset,
                    amount: credited,
                },
            ]
        };

        let record = self
            .payments
            .prepare(sender, recipient, amount, asset, clock);

        Ok(Changeset {
            balances,
            payment: Some(record),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;

    fn account(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    fn asset(symbol: &str) -> AssetId {
        AssetId::symbol(symbol).unwrap()
    }

    fn clock() -> u64 {
        1_700_000_000
    }

    fn funded_ledger() -> Ledger {
        let admin = account("admin");
        let mut ledger = Ledger::new(admin.clone());
        ledger.add_eligible_asset(&admin, asset("T")).unwrap();
        ledger
            .deposit(account("u1"), Amount::new(1000), asset("T"))
            .unwrap();
        ledger
    }

    #[test]
    fn test_deposit_credits_balance() {
        let ledger = funded_ledger();
        assert_eq!(ledger.balance_of(&account("u1"), &asset("T")), Amount::new(1000));
        assert_eq!(ledger.balance_of(&account("u2"), &asset("T")), Amount::ZERO);
    }

    #[test]
    fn test_zero_deposit_is_noop_success() {
        let mut ledger = funded_ledger();
        let before = ledger.clone();
        ledger
            .deposit(account("u1"), Amount::ZERO, asset("T"))
            .unwrap();
        ledger
            .deposit(account("ghost"), Amount::ZERO, asset("T"))
            .unwrap();
        assert_eq!(ledger, before);
        assert!(ledger.balances().all(|entry| entry.account != account("ghost")));
    }

    #[test]
    fn test_deposit_ineligible_asset() {
        let mut ledger = funded_ledger();
        assert_eq!(
            ledger.deposit(account("u1"), Amount::new(100), asset("T2")),
            Err(LedgerError::IneligibleAsset)
        );
        assert_eq!(ledger.balance_of(&account("u1"), &asset("T2")), Amount::ZERO);
    }

    #[test]
    fn test_deposit_overflow_fails_closed() {
        let mut ledger = funded_ledger();
        let before = ledger.clone();
        assert_eq!(
            ledger.deposit(account("u1"), Amount::MAX, asset("T")),
            Err(LedgerError::BalanceOverflow)
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_transfer_moves_funds_and_logs() {
        let mut ledger = funded_ledger();
        let id = ledger
            .transfer(account("u1"), account("u2"), Amount::new(500), asset("T"), &clock)
            .unwrap();

        assert_eq!(id, PaymentId(0));
        assert_eq!(ledger.balance_of(&account("u1"), &asset("T")), Amount::new(500));
        assert_eq!(ledger.balance_of(&account("u2"), &asset("T")), Amount::new(500));

        let record = ledger.payment(id).unwrap();
        assert_eq!(record.sender, account("u1"));
        assert_eq!(record.recipient, account("u2"));
        assert_eq!(record.amount, Amount::new(500));
        assert_eq!(record.asset, asset("T"));
        assert_eq!(record.status, PaymentStatus::Completed);
        assert_eq!(record.timestamp, clock());
    }

    #[test]
    fn test_failed_transfer_changes_nothing() {
        let mut ledger = funded_ledger();
        let before = ledger.clone();

        assert_eq!(
            ledger.transfer(account("u1"), account("u2"), Amount::new(1500), asset("T"), &clock),
            Err(LedgerError::InsufficientBalance)
        );
        assert_eq!(ledger, before);
        assert_eq!(ledger.payment(PaymentId(0)), Err(LedgerError::NotFound));
    }

    #[test]
    fn test_transfer_ineligible_asset_checked_first() {
        let mut ledger = funded_ledger();
        assert_eq!(
            ledger.transfer(account("u1"), account("u2"), Amount::new(1), asset("T2"), &clock),
            Err(LedgerError::IneligibleAsset)
        );
    }

    #[test]
    fn test_transfer_credit_overflow_fails_closed() {
        let admin = account("admin");
        let mut ledger = Ledger::new(admin.clone());
        ledger.add_eligible_asset(&admin, asset("T")).unwrap();
        ledger.deposit(account("rich"), Amount::MAX, asset("T")).unwrap();
        ledger.deposit(account("u1"), Amount::new(1), asset("T")).unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.transfer(account("u1"), account("rich"), Amount::new(1), asset("T"), &clock),
            Err(LedgerError::BalanceOverflow)
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_self_transfer_is_neutral_but_logged() {
        let mut ledger = funded_ledger();
        let id = ledger
            .transfer(account("u1"), account("u1"), Amount::new(700), asset("T"), &clock)
            .unwrap();
        assert_eq!(id, PaymentId(0));
        assert_eq!(ledger.balance_of(&account("u1"), &asset("T")), Amount::new(1000));
        assert_eq!(ledger.payments().len(), 1);

        // Still bounded by the balance
        assert_eq!(
            ledger.transfer(account("u1"), account("u1"), Amount::new(1001), asset("T"), &clock),
            Err(LedgerError::InsufficientBalance)
        );
    }

    #[test]
    fn test_zero_transfer_is_logged() {
        let mut ledger = funded_ledger();
        let id = ledger
            .transfer(account("nobody"), account("u2"), Amount::ZERO, asset("T"), &clock)
            .unwrap();
        assert_eq!(id, PaymentId(0));
        assert_eq!(ledger.payment(id).unwrap().amount, Amount::ZERO);
        assert_eq!(ledger.balances().count(), 1);
    }

    #[test]
    fn test_zero_transfer_plans_no_balance_entries() {
        let ledger = funded_ledger();
        let changes = ledger
            .plan(
                Operation::Transfer {
                    sender: account("a"),
                    recipient: account("b"),
                    amount: Amount::ZERO,
                    asset: asset("T"),
                },
                &clock,
            )
            .unwrap();
        assert!(changes.balances.is_empty());
        assert!(changes.payment.is_some());
    }

    #[test]
    fn test_removed_asset_keeps_balances() {
        let mut ledger = funded_ledger();
        let admin = account("admin");
        ledger.remove_eligible_asset(&admin, &asset("T")).unwrap();

        assert_eq!(ledger.balance_of(&account("u1"), &asset("T")), Amount::new(1000));
        assert_eq!(
            ledger.deposit(account("u1"), Amount::new(1), asset("T")),
            Err(LedgerError::IneligibleAsset)
        );
        assert_eq!(
            ledger.transfer(account("u1"), account("u2"), Amount::new(1), asset("T"), &clock),
            Err(LedgerError::IneligibleAsset)
        );
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let ledger = funded_ledger();
        let before = ledger.clone();
        let changes = ledger
            .plan(
                Operation::Transfer {
                    sender: account("u1"),
                    recipient: account("u2"),
                    amount: Amount::new(10),
                    asset: asset("T"),
                },
                &clock,
            )
            .unwrap();

        assert_eq!(ledger, before);
        assert_eq!(changes.balances.len(), 2);
        assert_eq!(changes.payment.as_ref().map(|r| r.id), Some(PaymentId(0)));
    }

    #[test]
    fn test_execute_admin_operations() {
        let mut ledger = Ledger::new(account("admin"));
        let outcome = ledger
            .execute(
                Operation::TransferAdministrator {
                    caller: account("admin"),
                    new_admin: account("u1"),
                },
                &clock,
            )
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(ledger.registry().administrator(), &account("u1"));

        assert_eq!(
            ledger.execute(
                Operation::AddEligibleAsset {
                    caller: account("admin"),
                    asset: asset("T3"),
                },
                &clock,
            ),
            Err(LedgerError::NotAuthorized)
        );
        assert!(!ledger.registry().is_eligible(&asset("T3")));
    }

    #[test]
    fn test_total_supply() {
        let mut ledger = funded_ledger();
        ledger
            .transfer(account("u1"), account("u2"), Amount::new(250), asset("T"), &clock)
            .unwrap();
        ledger.deposit(account("u3"), Amount::new(5), asset("T")).unwrap();
        assert_eq!(ledger.total_supply(&asset("T")), Some(Amount::new(1005)));
        assert_eq!(ledger.total_supply(&asset("OTHER")), Some(Amount::ZERO));
    }

    #[test]
    fn test_snapshot_rebuilds_same_ledger() {
        let mut ledger = funded_ledger();
        ledger
            .transfer(account("u1"), account("u2"), Amount::new(1), asset("T"), &clock)
            .unwrap();
        let rebuilt = Ledger::from_snapshot(ledger.snapshot());
        assert_eq!(rebuilt, ledger);
        assert_eq!(rebuilt.payments().next_id(), PaymentId(1));
    }
}

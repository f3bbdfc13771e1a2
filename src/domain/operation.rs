use super::ids::{AccountId, Amount, AssetId};
use super::payment::PaymentId;
use serde::Deserialize;
use thiserror::Error;

/// A request against the ledger, carrying the already-authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    AddEligibleAsset {
        caller: AccountId,
        asset: AssetId,
    },
    RemoveEligibleAsset {
        caller: AccountId,
        asset: AssetId,
    },
    TransferAdministrator {
        caller: AccountId,
        new_admin: AccountId,
    },
    Deposit {
        account: AccountId,
        amount: Amount,
        asset: AssetId,
    },
    Transfer {
        sender: AccountId,
        recipient: AccountId,
        amount: Amount,
        asset: AssetId,
    },
}

/// What a successful operation hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Transferred(PaymentId),
}

impl Outcome {
    pub fn payment_id(&self) -> Option<PaymentId> {
        match self {
            Outcome::Applied => None,
            Outcome::Transferred(id) => Some(*id),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    AddAsset,
    RemoveAsset,
    TransferAdmin,
    Deposit,
    Transfer,
}

/// One flat row of an operation batch, before per-type field checks.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub r#type: OperationType,
    pub caller: AccountId,
    pub counterparty: Option<AccountId>,
    pub amount: Option<Amount>,
    pub asset: Option<AssetId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{operation:?} row is missing its {field} field")]
pub struct MissingField {
    pub operation: OperationType,
    pub field: &'static str,
}

impl TryFrom<OperationRecord> for Operation {
    type Error = MissingField;

    fn try_from(record: OperationRecord) -> Result<Self, Self::Error> {
        let kind = record.r#type;
        let require = |field: &'static str| MissingField {
            operation: kind,
            field,
        };

        let operation = match kind {
            OperationType::AddAsset => Operation::AddEligibleAsset {
                caller: record.caller,
                asset: record.asset.ok_or_else(|| require("asset"))?,
            },
            OperationType::RemoveAsset => Operation::RemoveEligibleAsset {
                caller: record.caller,
                asset: record.asset.ok_or_else(|| require("asset"))?,
            },
            OperationType::TransferAdmin => Operation::TransferAdministrator {
                caller: record.caller,
                new_admin: record.counterparty.ok_or_else(|| require("counterparty"))?,
            },
            OperationType::Deposit => Operation::Deposit {
                account: record.caller,
                amount: record.amount.ok_or_else(|| require("amount"))?,
                asset: record.asset.ok_or_else(|| require("asset"))?,
            },
            OperationType::Transfer => Operation::Transfer {
                sender: record.caller,
                recipient: record.counterparty.ok_or_else(|| require("counterparty"))?,
                amount: record.amount.ok_or_else(|| require("amount"))?,
                asset: record.asset.ok_or_else(|| require("asset"))?,
            },
        };
        Ok(operation)
    }
}

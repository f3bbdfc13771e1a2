use miette::Diagnostic;
use thiserror::Error;

/// Failure kinds of the ledger core.
///
/// The set is flat and each kind carries a stable numeric code, so hosts can
/// branch on `code()` instead of message text.
#[derive(Debug, Error, Diagnostic, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller is not the administrator")]
    #[diagnostic(code(ledger::not_authorized))]
    NotAuthorized,
    #[error("asset is not eligible for ledger operations")]
    #[diagnostic(code(ledger::ineligible_asset))]
    IneligibleAsset,
    #[error("insufficient balance")]
    #[diagnostic(code(ledger::insufficient_balance))]
    InsufficientBalance,
    #[error("payment not found")]
    #[diagnostic(code(ledger::not_found))]
    NotFound,
    #[error("balance would exceed the representable range")]
    #[diagnostic(code(ledger::balance_overflow))]
    BalanceOverflow,
}

impl LedgerError {
    pub const fn code(&self) -> u32 {
        match self {
            LedgerError::NotAuthorized => 100,
            LedgerError::IneligibleAsset => 101,
            LedgerError::InsufficientBalance => 102,
            LedgerError::NotFound => 103,
            LedgerError::BalanceOverflow => 104,
        }
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            100 => Some(LedgerError::NotAuthorized),
            101 => Some(LedgerError::IneligibleAsset),
            102 => Some(LedgerError::InsufficientBalance),
            103 => Some(LedgerError::NotFound),
            104 => Some(LedgerError::BalanceOverflow),
            _ => None,
        }
    }
}

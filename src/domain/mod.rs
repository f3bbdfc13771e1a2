//! Ledger core: identifiers, the asset registry, balances and the payment
//! log. Everything here is synchronous and free of I/O.

pub mod error;
pub mod ids;
pub mod ledger;
pub mod operation;
pub mod payment;
pub mod ports;
pub mod registry;

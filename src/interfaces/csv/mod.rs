//! CSV adapters: operation batches in, balances and payment history out.

pub mod balance_writer;
pub mod operation_reader;
pub mod payment_writer;

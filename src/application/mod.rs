//! Application layer orchestrating the ledger core.
//!
//! This module defines the `LedgerEngine`, the entry point hosts use to run
//! operations. It uses an actor pattern with `tokio` channels: one task owns
//! the `Ledger` and its store, so every operation is planned, persisted and
//! applied before the next one starts.

pub mod engine;

//! Multi-asset balance ledger with atomic transfers, an admin-gated asset
//! registry and an append-only payment log.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

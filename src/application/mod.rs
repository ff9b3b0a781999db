//! Application layer containing the escrow orchestration.
//!
//! This module defines the `EscrowEngine`, the single entry point external
//! callers use. It composes the access policy with ledger mutations and funds
//! movements and commits each operation to storage as one unit.

pub mod engine;
pub mod operation;

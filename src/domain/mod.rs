//! Domain layer: ledger records, the seller registry, the order ledger and
//! the access policy that gates every transition.

pub mod access;
pub mod account;
pub mod identity;
pub mod ledger;
pub mod money;
pub mod order;
pub mod ports;
pub mod seller;

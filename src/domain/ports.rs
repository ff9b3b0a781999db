use super::account::FundsAccount;
use super::order::Order;
use super::seller::Seller;
use crate::error::Result;
use async_trait::async_trait;

/// Every record touched by one operation.
///
/// A store must apply a change set entirely or not at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeSet {
    pub sellers: Vec<Seller>,
    pub orders: Vec<Order>,
    pub accounts: Vec<FundsAccount>,
}

/// Persistence port for the escrow ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Atomically writes every record in `changes`.
    async fn commit(&self, changes: ChangeSet) -> Result<()>;
    /// All sellers in registration order.
    async fn sellers(&self) -> Result<Vec<Seller>>;
    /// All orders in id order.
    async fn orders(&self) -> Result<Vec<Order>>;
    async fn accounts(&self) -> Result<Vec<FundsAccount>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;

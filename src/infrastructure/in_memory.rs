use crate::domain::account::FundsAccount;
use crate::domain::identity::Identity;
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{ChangeSet, LedgerStore};
use crate::domain::seller::Seller;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    sellers: BTreeMap<u64, Seller>,
    orders: BTreeMap<OrderId, Order>,
    accounts: BTreeMap<Identity, FundsAccount>,
}

/// A thread-safe in-memory ledger store.
///
/// All tables live behind one `Arc<RwLock<..>>`, so a commit is applied under
/// a single write guard and readers never see half of a change set.
/// Ideal for testing or runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut tables = self.tables.write().await;
        for seller in changes.sellers {
            tables.sellers.insert(seller.seq, seller);
        }
        for order in changes.orders {
            tables.orders.insert(order.id(), order);
        }
        for account in changes.accounts {
            tables.accounts.insert(account.holder.clone(), account);
        }
        Ok(())
    }

    async fn sellers(&self) -> Result<Vec<Seller>> {
        let tables = self.tables.read().await;
        Ok(tables.sellers.values().cloned().collect())
    }

    async fn orders(&self) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().cloned().collect())
    }

    async fn accounts(&self) -> Result<Vec<FundsAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Balance};
    use crate::domain::order::OrderState;
    use rust_decimal_macros::dec;

    fn order(id: u64) -> Order {
        Order::new(
            OrderId(id),
            Identity::from("b1"),
            Identity::from("s1"),
            Amount::new(dec!(0.1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_in_memory_commit_and_read_back() {
        let store = InMemoryLedgerStore::new();
        let seller = Seller {
            seq: 0,
            address: Identity::from("s1"),
            registered: true,
        };
        let account = FundsAccount {
            holder: Identity::from("b1"),
            balance: Balance::new(dec!(-0.1)),
        };

        store
            .commit(ChangeSet {
                sellers: vec![seller.clone()],
                orders: vec![order(0)],
                accounts: vec![account.clone()],
            })
            .await
            .unwrap();

        assert_eq!(store.sellers().await.unwrap(), vec![seller]);
        assert_eq!(store.orders().await.unwrap(), vec![order(0)]);
        assert_eq!(store.accounts().await.unwrap(), vec![account]);
    }

    #[tokio::test]
    async fn test_in_memory_orders_are_upserted_in_id_order() {
        let store = InMemoryLedgerStore::new();
        store
            .commit(ChangeSet {
                orders: vec![order(1), order(0)],
                ..ChangeSet::default()
            })
            .await
            .unwrap();
        store
            .commit(ChangeSet {
                orders: vec![order(0).with_state(OrderState::Confirmed)],
                ..ChangeSet::default()
            })
            .await
            .unwrap();

        let orders = store.orders().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id(), OrderId(0));
        assert_eq!(orders[0].state(), OrderState::Confirmed);
        assert_eq!(orders[1].state(), OrderState::Created);
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = InMemoryLedgerStore::new();
        let handle = store.clone();
        store
            .commit(ChangeSet {
                orders: vec![order(0)],
                ..ChangeSet::default()
            })
            .await
            .unwrap();
        assert_eq!(handle.orders().await.unwrap().len(), 1);
    }
}

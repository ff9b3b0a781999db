use crate::domain::account::FundsAccount;
use crate::domain::order::Order;
use crate::domain::ports::{ChangeSet, LedgerStore};
use crate::domain::seller::Seller;
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for seller registrations, keyed by registration sequence.
pub const CF_SELLERS: &str = "sellers";
/// Column Family for orders, keyed by order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for participant funds accounts, keyed by holder.
pub const CF_ACCOUNTS: &str = "accounts";

/// A persistent ledger store using RocksDB.
///
/// Sellers, orders and funds accounts live in separate Column Families with
/// JSON values. Numeric keys are big-endian so iteration follows registration
/// and creation order. Each commit is written as one `WriteBatch`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_SELLERS, CF_ORDERS, CF_ACCOUNTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EscrowError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn scan<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let cf = self.cf(name)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut batch = WriteBatch::default();

        let sellers = self.cf(CF_SELLERS)?;
        for seller in &changes.sellers {
            batch.put_cf(sellers, seller.seq.to_be_bytes(), serde_json::to_vec(seller)?);
        }

        let orders = self.cf(CF_ORDERS)?;
        for order in &changes.orders {
            batch.put_cf(orders, order.id().0.to_be_bytes(), serde_json::to_vec(order)?);
        }

        let accounts = self.cf(CF_ACCOUNTS)?;
        for account in &changes.accounts {
            batch.put_cf(
                accounts,
                account.holder.as_str().as_bytes(),
                serde_json::to_vec(account)?,
            );
        }

        self.db.write(batch)?;
        Ok(())
    }

    async fn sellers(&self) -> Result<Vec<Seller>> {
        self.scan(CF_SELLERS)
    }

    async fn orders(&self) -> Result<Vec<Order>> {
        self.scan(CF_ORDERS)
    }

    async fn accounts(&self) -> Result<Vec<FundsAccount>> {
        self.scan(CF_ACCOUNTS)
    }
}

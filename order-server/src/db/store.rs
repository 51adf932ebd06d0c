//! redb-based storage for the marketplace backend
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `items` | `item_id` | `Item` | Catalog with embedded per-SKU stock |
//! | `carts` | `actor_key` | `Cart` | One cart per actor |
//! | `orders` | `order_id` | `Order` | Order ledger |
//! | `merchant_index` | `merchant_order_id` | `order_id` | Gateway callback lookup |
//! | `wallets` | `partner_id` | `Wallet` | Partner wallet ledger |
//! | `addresses` | `address_id` | `Address` | Saved addresses |
//! | `counters` | name | `u64` | Crash-safe order numbering |
//!
//! All documents are stored as JSON. redb commits are durable as soon as
//! `commit()` returns and the file is always in a consistent state, so a
//! crash mid-operation leaves no partial stock or wallet mutation behind.
//!
//! Every order-mutating operation runs inside a single write transaction
//! through [`Store::with_write`]; stock checks and decrements therefore
//! execute atomically with respect to each other.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::AppError;
use shared::models::{ActorRef, Address, Cart, Item, Wallet};
use shared::order::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("items");
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Secondary index: merchant order id (gateway session) -> order id
const MERCHANT_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("merchant_index");

const WALLETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");
const ADDRESSES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("addresses");
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_SEQ_KEY: &str = "order_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::database(err.to_string())
    }
}

/// Document store backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(ITEMS_TABLE)?;
            let _ = txn.open_table(CARTS_TABLE)?;
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(MERCHANT_INDEX_TABLE)?;
            let _ = txn.open_table(WALLETS_TABLE)?;
            let _ = txn.open_table(ADDRESSES_TABLE)?;
            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_SEQ_KEY)?.is_none() {
                counters.insert(ORDER_SEQ_KEY, 0u64)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Run a closure inside a write transaction: commit on Ok, abort on Err
    ///
    /// The closure must not perform network I/O; gateway calls happen
    /// before the transaction and are re-validated inside it.
    pub fn with_write<T>(
        &self,
        f: impl FnOnce(&WriteTransaction) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                txn.abort().map_err(StoreError::from)?;
                Err(err)
            }
        }
    }

    // ==================== Generic JSON document access ====================

    fn get_doc<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let txn = self.db.begin_read()?;
        let tbl = txn.open_table(table)?;
        match tbl.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn get_doc_txn<T: DeserializeOwned>(
        txn: &WriteTransaction,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let tbl = txn.open_table(table)?;
        match tbl.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn put_doc_txn<T: Serialize>(
        txn: &WriteTransaction,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
        doc: &T,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        let mut tbl = txn.open_table(table)?;
        tbl.insert(key, bytes.as_slice())?;
        Ok(())
    }

    fn scan_docs<T, F>(&self, table: TableDefinition<&str, &[u8]>, keep: F) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let txn = self.db.begin_read()?;
        let tbl = txn.open_table(table)?;
        let mut out = Vec::new();
        for entry in tbl.iter()? {
            let (_, value) = entry?;
            let doc: T = serde_json::from_slice(value.value())?;
            if keep(&doc) {
                out.push(doc);
            }
        }
        Ok(out)
    }

    // ==================== Items ====================

    pub fn get_item(&self, item_id: &str) -> StoreResult<Option<Item>> {
        self.get_doc(ITEMS_TABLE, item_id)
    }

    pub fn get_item_txn(txn: &WriteTransaction, item_id: &str) -> StoreResult<Option<Item>> {
        Self::get_doc_txn(txn, ITEMS_TABLE, item_id)
    }

    pub fn put_item_txn(txn: &WriteTransaction, item: &Item) -> StoreResult<()> {
        Self::put_doc_txn(txn, ITEMS_TABLE, &item.id, item)
    }

    // ==================== Carts ====================

    pub fn get_cart(&self, actor: &ActorRef) -> StoreResult<Option<Cart>> {
        self.get_doc(CARTS_TABLE, &actor.storage_key())
    }

    pub fn get_cart_txn(txn: &WriteTransaction, actor: &ActorRef) -> StoreResult<Option<Cart>> {
        Self::get_doc_txn(txn, CARTS_TABLE, &actor.storage_key())
    }

    pub fn put_cart_txn(txn: &WriteTransaction, cart: &Cart) -> StoreResult<()> {
        Self::put_doc_txn(txn, CARTS_TABLE, &cart.actor.storage_key(), cart)
    }

    // ==================== Orders ====================

    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.get_doc(ORDERS_TABLE, order_id)
    }

    pub fn get_order_txn(txn: &WriteTransaction, order_id: &str) -> StoreResult<Option<Order>> {
        Self::get_doc_txn(txn, ORDERS_TABLE, order_id)
    }

    pub fn put_order_txn(txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        Self::put_doc_txn(txn, ORDERS_TABLE, &order.order_id, order)
    }

    /// Newest-first order list for one actor
    pub fn list_orders_for_actor(&self, actor: &ActorRef) -> StoreResult<Vec<Order>> {
        let mut orders = self.scan_docs::<Order, _>(ORDERS_TABLE, |o| &o.actor == actor)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Index a gateway checkout session back to its order
    pub fn put_merchant_index_txn(
        txn: &WriteTransaction,
        merchant_order_id: &str,
        order_id: &str,
    ) -> StoreResult<()> {
        let mut tbl = txn.open_table(MERCHANT_INDEX_TABLE)?;
        tbl.insert(merchant_order_id, order_id)?;
        Ok(())
    }

    pub fn order_id_for_merchant(&self, merchant_order_id: &str) -> StoreResult<Option<String>> {
        let txn = self.db.begin_read()?;
        let tbl = txn.open_table(MERCHANT_INDEX_TABLE)?;
        Ok(tbl.get(merchant_order_id)?.map(|g| g.value().to_string()))
    }

    // ==================== Wallets ====================

    pub fn get_wallet(&self, partner_id: &str) -> StoreResult<Option<Wallet>> {
        self.get_doc(WALLETS_TABLE, partner_id)
    }

    pub fn get_wallet_txn(txn: &WriteTransaction, partner_id: &str) -> StoreResult<Option<Wallet>> {
        Self::get_doc_txn(txn, WALLETS_TABLE, partner_id)
    }

    pub fn put_wallet_txn(txn: &WriteTransaction, wallet: &Wallet) -> StoreResult<()> {
        Self::put_doc_txn(txn, WALLETS_TABLE, &wallet.partner_id, wallet)
    }

    // ==================== Addresses ====================

    pub fn get_address(&self, address_id: &str) -> StoreResult<Option<Address>> {
        self.get_doc(ADDRESSES_TABLE, address_id)
    }

    pub fn put_address_txn(txn: &WriteTransaction, address: &Address) -> StoreResult<()> {
        Self::put_doc_txn(txn, ADDRESSES_TABLE, &address.id, address)
    }

    pub fn list_addresses_for_actor(&self, actor: &ActorRef) -> StoreResult<Vec<Address>> {
        self.scan_docs::<Address, _>(ADDRESSES_TABLE, |a| &a.actor == actor)
    }

    // ==================== Order numbering ====================

    /// Next human-readable order id, e.g. `ORD20260823000042`
    ///
    /// The counter lives in the same write transaction as the order
    /// insert, so numbering survives crashes without gaps or reuse.
    pub fn next_order_id(txn: &WriteTransaction) -> StoreResult<String> {
        let mut counters = txn.open_table(COUNTERS_TABLE)?;
        let current = counters.get(ORDER_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        counters.insert(ORDER_SEQ_KEY, next)?;
        let date = chrono::Utc::now().format("%Y%m%d");
        Ok(format!("ORD{}{:06}", date, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{ColorGroup, SizeVariant};

    fn sample_item(id: &str) -> Item {
        Item {
            id: id.into(),
            name: "Test Item".into(),
            mrp: Decimal::from(999),
            discounted_price: Decimal::from(799),
            color_groups: vec![ColorGroup {
                color: "Blue".into(),
                sizes: vec![SizeVariant::new("M", "SKU-1", 10)],
            }],
            ppq_tiers: vec![],
            images: vec![],
        }
    }

    #[test]
    fn test_item_round_trip() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_write(|txn| {
                Store::put_item_txn(txn, &sample_item("item-1"))?;
                Ok(())
            })
            .unwrap();

        let item = store.get_item("item-1").unwrap().unwrap();
        assert_eq!(item.name, "Test Item");
        assert!(store.get_item("missing").unwrap().is_none());
    }

    #[test]
    fn test_with_write_aborts_on_error() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), AppError> = store.with_write(|txn| {
            Store::put_item_txn(txn, &sample_item("item-1"))?;
            Err(AppError::invalid_request("boom"))
        });
        assert!(result.is_err());
        // The insert above must not be visible
        assert!(store.get_item("item-1").unwrap().is_none());
    }

    #[test]
    fn test_order_ids_are_sequential() {
        let store = Store::open_in_memory().unwrap();
        let (a, b) = store
            .with_write(|txn| {
                let a = Store::next_order_id(txn)?;
                let b = Store::next_order_id(txn)?;
                Ok((a, b))
            })
            .unwrap();
        assert!(a.starts_with("ORD"));
        assert!(a.ends_with("000001"));
        assert!(b.ends_with("000002"));
    }

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let store = Store::open(&path).unwrap();
            store
                .with_write(|txn| {
                    Store::next_order_id(txn)?;
                    Ok(())
                })
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        let id = store
            .with_write(|txn| Ok(Store::next_order_id(txn)?))
            .unwrap();
        assert!(id.ends_with("000002"));
    }

    #[test]
    fn test_merchant_index() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_write(|txn| {
                Store::put_merchant_index_txn(txn, "m-123", "ORD1")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            store.order_id_for_merchant("m-123").unwrap().as_deref(),
            Some("ORD1")
        );
        assert!(store.order_id_for_merchant("m-999").unwrap().is_none());
    }
}

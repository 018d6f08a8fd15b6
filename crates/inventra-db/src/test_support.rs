//! Shared fixtures for repository tests.

use std::time::Duration;

use inventra_core::{NewProduct, Product};
use tempfile::TempDir;

use crate::pool::{Database, DbConfig};

/// Fresh in-memory database with migrations applied.
pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database for tests that need several connections.
///
/// Both database files live in a scratch directory removed on drop.
pub struct FileDb {
    pub db: Database,
    _dir: TempDir,
}

impl FileDb {
    pub async fn new(max_connections: u32) -> Self {
        let dir = TempDir::new().unwrap();

        let config = DbConfig::new(dir.path().join("inventra.db"))
            .max_connections(max_connections)
            .busy_timeout(Duration::from_secs(30));
        let db = Database::new(config).await.unwrap();

        FileDb { db, _dir: dir }
    }
}

/// A product input with the given code, price and opening stock.
pub fn new_product(code: &str, price_cents: i64, quantity: i64) -> NewProduct {
    NewProduct {
        product_code: code.to_string(),
        name: format!("Product {code}"),
        supplier_name: "Supplier".to_string(),
        category: "General".to_string(),
        price_cents,
        quantity,
        created_by: Some("tester".to_string()),
    }
}

/// Inserts a product and returns it.
pub async fn seed_product(db: &Database, code: &str, price_cents: i64, quantity: i64) -> Product {
    db.products()
        .insert(&new_product(code, price_cents, quantity))
        .await
        .unwrap()
}

//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Ownership of `quantity`
//! ```text
//! insert()  ── sets the opening stock, once
//!                    │
//!                    ▼
//!           products.quantity ◄── StockLedger (every later change)
//! ```
//!
//! Nothing in this repository writes `quantity` after insert.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use inventra_core::validation::validate_new_product;
use inventra_core::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = r#"
    id,
    product_code,
    name,
    supplier_name,
    category,
    price_cents,
    quantity,
    created_by,
    created_at,
    updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.insert(&new_product).await?;
/// let same = repo.get_by_code("KOPI-250").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with its opening stock.
    ///
    /// ## Errors
    /// - `Core(Validation)` - bad code, empty name, negative price/quantity
    /// - `UniqueViolation` - product code already exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        let code = product.product_code.trim();
        let now = Utc::now();

        debug!(product_code = %code, "Inserting product");

        let sql = format!(
            r#"
            INSERT INTO products (
                product_code, name, supplier_name, category,
                price_cents, quantity, created_by, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .bind(product.name.trim())
            .bind(product.supplier_name.trim())
            .bind(product.category.trim())
            .bind(product.price_cents)
            .bind(product.quantity)
            .bind(product.created_by.as_deref())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("product_code", code),
                other => other,
            })?;

        info!(
            product_id = inserted.id,
            product_code = %inserted.product_code,
            quantity = inserted.quantity,
            "Product created"
        );

        Ok(inserted)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its product code (exact match after trimming).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_code = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by product code.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_code LIMIT ?1 OFFSET ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

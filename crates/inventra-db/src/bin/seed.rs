//! # Seed Data Generator
//!
//! Populates the database with products and demo orders for development.
//!
//! ## Usage
//! ```bash
//! # 200 products, 50 orders (defaults)
//! cargo run -p inventra-db --bin seed
//!
//! # Custom amounts
//! cargo run -p inventra-db --bin seed -- --products 1000 --orders 300
//!
//! # Database path (otherwise INVENTRA_DATABASE_PATH or ./inventra.db)
//! cargo run -p inventra-db --bin seed -- --db ./data/inventra.db
//! ```
//!
//! Orders go through the normal placement path, so they draw real order
//! numbers and decrement stock. Orders that run out of stock are
//! reported and skipped.

use std::env;
use std::path::PathBuf;

use inventra_core::{CoreError, NewProduct, OrderLineRequest, OrderStatus, PlaceOrderRequest};
use inventra_db::{AppConfig, Database, DbError};
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Product families per category: (category, supplier, names).
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Beverages",
        "Kapal Api",
        &["Kopi Bubuk", "Kopi Susu", "Teh Melati", "Teh Hijau", "Cokelat Bubuk"],
    ),
    (
        "Groceries",
        "Gulaku",
        &["Gula Pasir", "Gula Aren", "Tepung Terigu", "Beras Pandan", "Garam Dapur"],
    ),
    (
        "Snacks",
        "Mayora",
        &["Biskuit Kelapa", "Wafer Cokelat", "Keripik Singkong", "Kacang Atom", "Permen Jahe"],
    ),
    (
        "Household",
        "Wings",
        &["Sabun Cuci", "Deterjen Bubuk", "Pewangi Pakaian", "Sikat Gigi", "Tisu Wajah"],
    ),
];

/// Pack sizes and the price added for each.
const SIZES: &[(&str, i64)] = &[("100g", 0), ("250g", 450), ("500g", 900), ("1kg", 1600)];

const PLATFORMS: &[&str] = &["shopee", "tokopedia", "walk-in", "whatsapp"];

const DESTINATIONS: &[&str] = &["Jakarta", "Bandung", "Surabaya", "Medan", "Makassar"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut product_count: usize = 200;
    let mut order_count: usize = 50;
    let mut db_path: PathBuf = config.database_path.clone();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-p" => {
                if let Some(v) = args.get(i + 1) {
                    product_count = v.parse()?;
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if let Some(v) = args.get(i + 1) {
                    order_count = v.parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(v) = args.get(i + 1) {
                    db_path = PathBuf::from(v);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Inventra Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --products <N>  Products to generate (default: 200)");
                println!("  -o, --orders <N>    Demo orders to place (default: 50)");
                println!("  -d, --db <PATH>     Database file path");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("Inventra Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path.display());
    println!("Products: {}", product_count);
    println!("Orders:   {}", order_count);
    println!();

    let app = AppConfig {
        database_path: db_path,
        ..config
    };
    let db = Database::new(app.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let product_ids = seed_products(&db, product_count).await;
    println!(
        "Generated {} products in {:?}",
        product_ids.len(),
        start.elapsed()
    );

    if product_ids.is_empty() {
        return Ok(());
    }

    let placed = seed_orders(&db, &app, &product_ids, order_count).await?;
    println!("Placed {} of {} orders", placed, order_count);
    println!(
        "Next order number: {}",
        db.sequencer().peek_next().await?
    );

    println!();
    println!("Top products by revenue:");
    for sales in db.orders().top_products(5).await? {
        println!(
            "  {:<16} {:>5} sold  {:>12}",
            sales.product_code,
            sales.quantity_sold,
            inventra_core::Money::from_cents(sales.revenue_cents)
        );
    }

    db.close().await;
    println!();
    println!("Seed complete!");

    Ok(())
}

/// Inserts up to `count` products and returns their ids.
async fn seed_products(db: &Database, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);

    for product in catalog_products(count) {
        match db.products().insert(&product).await {
            Ok(created) => ids.push(created.id),
            Err(e) => warn!(product_code = %product.product_code, error = %e, "Insert failed"),
        }
    }

    info!(count = ids.len(), "Products seeded");
    ids
}

/// `count` products walking the catalog by size, then name, then category.
///
/// Past one full pass the names take a batch suffix; codes stay unique
/// through the running seed.
fn catalog_products(count: usize) -> impl Iterator<Item = NewProduct> {
    let families: Vec<(&str, &str, &str)> = CATALOG
        .iter()
        .flat_map(|(category, supplier, names)| {
            names.iter().map(move |name| (*category, *supplier, *name))
        })
        .collect();
    let per_pass = families.len() * SIZES.len();

    (0..count).map(move |seed| {
        let (category, supplier, name) = families[(seed / SIZES.len()) % families.len()];
        let (size, price_addon) = SIZES[seed % SIZES.len()];

        let batch = seed / per_pass;
        let name = if batch == 0 {
            name.to_string()
        } else {
            format!("{} #{}", name, batch + 1)
        };

        generate_product(category, supplier, &name, size, price_addon, seed)
    })
}

/// Places `count` demo orders; returns how many succeeded.
async fn seed_orders(
    db: &Database,
    config: &AppConfig,
    product_ids: &[i64],
    count: usize,
) -> Result<usize, DbError> {
    let orders = db.orders();
    let mut placed = 0;

    for n in 0..count {
        let lines = 1 + n % 3;
        let items = (0..lines)
            .map(|l| {
                let product_id = product_ids[(n * 7 + l * 13) % product_ids.len()];
                OrderLineRequest::new(product_id, 1 + ((n + l) % 4) as i64)
            })
            .collect();

        let status = OrderStatus::ALL[n % OrderStatus::ALL.len()];
        let request = PlaceOrderRequest::new(format!("cust-{:04}", n % 40), items)
            .status(status.as_str())
            .platform(PLATFORMS[n % PLATFORMS.len()])
            .destination(DESTINATIONS[n % DESTINATIONS.len()]);

        let deadline = Instant::now() + config.order_timeout;
        match orders.place_order_before(request, deadline).await {
            Ok(details) => {
                placed += 1;
                info!(
                    order_number = %details.order.order_number,
                    total = %details.order.total(),
                    "Demo order placed"
                );
            }
            Err(DbError::Core(CoreError::InsufficientStock { product_code, .. })) => {
                warn!(product_code = %product_code, "Demo order skipped, out of stock");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(placed)
}

/// Builds one product with deterministic pseudo-random values.
fn generate_product(
    category: &str,
    supplier: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    let prefix: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_uppercase();

    NewProduct {
        product_code: format!("{}-{}-{:03}", prefix, size.to_uppercase(), seed),
        name: format!("{} {}", name, size),
        supplier_name: supplier.to_string(),
        category: category.to_string(),
        price_cents: 500 + ((seed * 37) % 2000) as i64 + price_addon,
        quantity: (seed % 60) as i64,
        created_by: Some("seed".to_string()),
    }
}

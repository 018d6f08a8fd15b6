//! # Repository Module
//!
//! Database repository implementations for Inventra.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Tables                        │
//! │                                                                         │
//! │  Calling layer                                                         │
//! │       │  db.orders().place_order(request)                              │
//! │       ▼                                                                 │
//! │  OrderRepository ──────────┬──────────────────┐                        │
//! │       │ (one transaction)  │                  │                        │
//! │       ▼                    ▼                  ▼                        │
//! │  orders, order_items   StockLedger        OrderNumberSequencer         │
//! │                        (products.quantity) (sequence store, own file)  │
//! │                                                                         │
//! │  ProductRepository ── products (catalog CRUD, never touches quantity   │
//! │                        after insert)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product insert and lookup
//! - [`StockLedger`] - The only writer of quantity-on-hand
//! - [`OrderNumberSequencer`] - `#NNNNNN` order numbers
//! - [`OrderRepository`] - Order placement and order reads/maintenance
//!
//! [`ProductRepository`]: product::ProductRepository
//! [`StockLedger`]: stock::StockLedger
//! [`OrderNumberSequencer`]: sequence::OrderNumberSequencer
//! [`OrderRepository`]: order::OrderRepository

pub mod order;
pub mod product;
pub mod sequence;
pub mod stock;

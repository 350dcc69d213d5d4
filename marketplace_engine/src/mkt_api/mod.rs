//! # Marketplace engine public API
//!
//! The `mkt_api` module exposes the programmatic API for the marketplace engine. Every API is a thin struct over a
//! storage backend that implements the traits in [`crate::traits`], so callers pick only the functionality they need.
//!
//! * [`order_placement_api`] turns a customer's cart into a priced, persisted order with its stock reserved.
//! * [`product_api`] serves products with lapsed specials reverted, and lets sellers manage their listings.
//! * [`order_query_api`] lists orders for customers and sellers and drives fulfilment status changes.
//! * [`seller_api`] tracks seller activity and locks dormant seller accounts.
//!
//! # API usage
//!
//! ```rust,ignore
//! use marketplace_engine::{events::EventProducers, OrderPlacementApi, PricingPolicy, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/marketplace.db", 5).await?;
//! let api = OrderPlacementApi::new(db, PricingPolicy::default(), EventProducers::default());
//! let order = api.place_order(&customer_id, request).await?;
//! ```
pub mod errors;
pub mod order_objects;
pub mod order_placement_api;
pub mod order_query_api;
pub mod product_api;
pub mod product_objects;
pub mod seller_api;

//! Campus Marketplace Engine
//!
//! The core logic of the campus marketplace: turning carts into orders and keeping product prices honest.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend, [`SqliteDatabase`]). The traits define what a backend must do;
//!    the engine never talks to the database directly. The data types shared by every layer live in [`db_types`].
//! 2. The engine public API ([`mod@mkt_api`]). Order placement, product reads with special-price reconciliation,
//!    order fulfilment and seller account housekeeping.
//!
//! The engine also emits [`events`] when orders are created or change status, when a lapsed special is reverted,
//! and when a seller is locked, so that notification and audit concerns can hook in without touching the core flows.
pub mod db_types;
pub mod events;
mod mkt_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use mkt_api::{
    errors::{OrderPlacementError, OrderQueryError, ProductApiError, SellerApiError},
    order_objects,
    order_placement_api::OrderPlacementApi,
    order_query_api::OrderQueryApi,
    product_api::ProductApi,
    product_objects,
    seller_api::{SellerApi, SellerPolicy},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    CatalogError,
    OrderManagement,
    OrderManagementError,
    ProductCatalog,
    SellerManagement,
    SellerManagementError,
};

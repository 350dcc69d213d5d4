//! # Storage contracts
//!
//! This module defines the behaviour a storage backend must expose in order to back the marketplace engine. The
//! engine APIs in [`crate::mkt_api`] are generic over these traits, so alternative backends (or test mocks) can be
//! swapped in without touching the business rules.
//!
//! * [`ProductCatalog`] stores products and applies partial updates and special-price reversals.
//! * [`OrderManagement`] stores orders. Placing an order and reserving its stock is a single atomic operation.
//! * [`SellerManagement`] tracks seller activity and applies inactivity locks.
mod order_management;
mod product_catalog;
mod seller_management;

pub use order_management::{OrderManagement, OrderManagementError};
pub use product_catalog::{CatalogError, ProductCatalog};
pub use seller_management::{SellerManagement, SellerManagementError};

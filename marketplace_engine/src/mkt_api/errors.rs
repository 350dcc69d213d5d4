use thiserror::Error;

use crate::{
    db_types::{OrderStatusType, ProductId, UserId},
    traits::{CatalogError, OrderManagementError, SellerManagementError},
};

/// Everything that can stop a cart from becoming an order. Every variant except `Unexpected` is raised before
/// anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderPlacementError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Invalid product id: {0}")]
    InvalidIdentity(String),
    #[error("Product {0} not found")]
    ProductNotFound(String),
    #[error("Insufficient stock for {name}. Requested {requested}, but only {available} available")]
    InsufficientStock { product: ProductId, name: String, available: i64, requested: i64 },
    #[error("{0}")]
    ValidationFailed(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<CatalogError> for OrderPlacementError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProductNotFound(id) => OrderPlacementError::ProductNotFound(id.to_string()),
            e => OrderPlacementError::Unexpected(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductApiError {
    #[error("Invalid product id: {0}")]
    InvalidIdentity(String),
    #[error("Product {0} not found")]
    ProductNotFound(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<CatalogError> for ProductApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::ProductNotFound(id) => ProductApiError::ProductNotFound(id.to_string()),
            CatalogError::EmptyUpdate => ProductApiError::ValidationFailed(e.to_string()),
            CatalogError::DatabaseError(s) => ProductApiError::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderQueryError {
    #[error("Invalid order id: {0}")]
    InvalidIdentity(String),
    #[error("Order {0} not found")]
    OrderNotFound(String),
    #[error("An order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderManagementError> for OrderQueryError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::OrderNotFound(id) => OrderQueryError::OrderNotFound(id.to_string()),
            e => OrderQueryError::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SellerApiError {
    #[error("Seller account {seller} is locked. {reason}")]
    SellerLocked { seller: UserId, reason: String },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<SellerManagementError> for SellerApiError {
    fn from(e: SellerManagementError) -> Self {
        match e {
            SellerManagementError::DatabaseError(s) => SellerApiError::DatabaseError(s),
        }
    }
}

use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, OrderStatusType, OrderStatusUpdate, ProductId, UserId};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Insufficient stock for product {product}. Requested {requested}, but only {available} available")]
    InsufficientStock { product: ProductId, available: i64, requested: i64 },
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order} was moved to {current} by another request")]
    StatusChanged { order: OrderId, current: OrderStatusType },
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines behaviour for persisting and querying orders.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and its item snapshots, and decrements the stock of every product in the order, as a single
    /// atomic unit of work.
    ///
    /// Each decrement only succeeds if enough stock remains at the moment it is applied. If any decrement fails,
    /// nothing is written and [`OrderManagementError::InsufficientStock`] (or
    /// [`OrderManagementError::ProductNotFound`] if the product has since been deleted) is returned.
    async fn insert_order_and_reserve_stock(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderManagementError>;

    /// All orders placed by the customer, newest first.
    async fn fetch_orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, OrderManagementError>;

    /// All orders holding at least one item sold by `seller`, newest first.
    async fn fetch_orders_for_seller(&self, seller: &UserId) -> Result<Vec<Order>, OrderManagementError>;

    /// Writes the new status, escrow state and tracking number, provided the order still has the status
    /// `update.from`. Otherwise nothing is written and [`OrderManagementError::StatusChanged`] carries the status the
    /// order has now. Transition rules are enforced by the caller.
    async fn update_order_status(
        &self,
        id: &OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, OrderManagementError>;
}

//! `SqliteDatabase` is the SQLite implementation of the marketplace storage backend.
//!
//! It implements every trait in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{db_url, new_pool, orders, products, sellers};
use crate::{
    db_types::{
        Cents,
        NewOrder,
        NewProduct,
        Order,
        OrderId,
        OrderStatusUpdate,
        Product,
        ProductId,
        ProductUpdate,
        Seller,
        UserId,
    },
    product_objects::ProductQueryFilter,
    traits::{
        CatalogError,
        OrderManagement,
        OrderManagementError,
        ProductCatalog,
        SellerManagement,
        SellerManagementError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(id, &mut conn).await?)
    }

    async fn fetch_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::search_products(query, &mut conn).await?)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        debug!("🗃️ Product {} has been saved in the DB", product.id);
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        seller: &UserId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::update_product(id, seller, update, &mut conn).await
    }

    async fn delete_product(&self, id: &ProductId, seller: &UserId) -> Result<bool, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::delete_product(id, seller, &mut conn).await?)
    }

    async fn revert_special_price(&self, id: &ProductId, restored_price: Cents) -> Result<bool, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let rows = products::revert_special_price(id, restored_price, Utc::now(), &mut conn).await?;
        if rows == 0 {
            trace!("🗃️ Product {id} no longer carries a lapsed special. Nothing reverted");
        }
        Ok(rows > 0)
    }
}

impl OrderManagement for SqliteDatabase {
    /// Runs the whole placement in a single transaction:
    /// * the order header and item snapshots are inserted,
    /// * each product's stock is decremented with a conditional update that only applies if enough stock is left.
    ///
    /// If any decrement does not apply, the transaction is dropped without committing, which rolls back every
    /// write made so far.
    async fn insert_order_and_reserve_stock(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let reservations: Vec<(ProductId, i64)> =
            order.items.iter().map(|i| (i.product_id.clone(), i.quantity)).collect();
        let order = orders::insert_order(order, &mut tx).await?;
        for (product_id, quantity) in reservations {
            if !products::reserve_stock(&product_id, quantity, &mut tx).await? {
                let current = products::fetch_product(&product_id, &mut tx).await?;
                debug!("🗃️ Stock reservation for {product_id} x{quantity} failed. Rolling back order {}", order.id);
                return Err(match current {
                    Some(p) => OrderManagementError::InsufficientStock {
                        product: product_id,
                        available: p.stock,
                        requested: quantity,
                    },
                    None => OrderManagementError::ProductNotFound(product_id),
                });
            }
            trace!("🗃️ Reserved {quantity} of {product_id} for order {}", order.id);
        }
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with {} items", order.id, order.items.len());
        Ok(order)
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(id, &mut conn).await?)
    }

    async fn fetch_orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::orders_for_customer(customer, &mut conn).await?)
    }

    async fn fetch_orders_for_seller(&self, seller: &UserId) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::orders_for_seller(seller, &mut conn).await?)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(order) = orders::update_order_status(id, update, &mut conn).await? {
            return Ok(order);
        }
        match orders::fetch_order(id, &mut conn).await? {
            Some(order) => Err(OrderManagementError::StatusChanged { order: order.id, current: order.status }),
            None => Err(OrderManagementError::OrderNotFound(id.clone())),
        }
    }
}

impl SellerManagement for SqliteDatabase {
    async fn fetch_seller(&self, id: &UserId) -> Result<Option<Seller>, SellerManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(sellers::fetch_seller(id, &mut conn).await?)
    }

    async fn record_seller_activity(&self, id: &UserId, at: DateTime<Utc>) -> Result<Seller, SellerManagementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(sellers::upsert_activity(id, at, &mut conn).await?)
    }

    async fn lock_inactive_sellers(
        &self,
        cutoff: DateTime<Utc>,
        fee: Cents,
        reason: &str,
    ) -> Result<Vec<Seller>, SellerManagementError> {
        let mut tx = self.pool.begin().await?;
        let locked = sellers::lock_inactive(cutoff, fee, reason, &mut tx).await?;
        tx.commit().await?;
        Ok(locked)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `MKT_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date with the migrations embedded in this crate.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

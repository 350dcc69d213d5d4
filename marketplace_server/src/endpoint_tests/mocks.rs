use chrono::{DateTime, Utc};
use marketplace_engine::{
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
use mockall::mock;

mock! {
    pub Marketplace {}
    impl ProductCatalog for Marketplace {
        async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
        async fn fetch_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;
        async fn update_product(&self, id: &ProductId, seller: &UserId, update: ProductUpdate) -> Result<Option<Product>, CatalogError>;
        async fn delete_product(&self, id: &ProductId, seller: &UserId) -> Result<bool, CatalogError>;
        async fn revert_special_price(&self, id: &ProductId, restored_price: Cents) -> Result<bool, CatalogError>;
    }
    impl OrderManagement for Marketplace {
        async fn insert_order_and_reserve_stock(&self, order: NewOrder) -> Result<Order, OrderManagementError>;
        async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_orders_for_customer(&self, customer: &UserId) -> Result<Vec<Order>, OrderManagementError>;
        async fn fetch_orders_for_seller(&self, seller: &UserId) -> Result<Vec<Order>, OrderManagementError>;
        async fn update_order_status(&self, id: &OrderId, update: OrderStatusUpdate) -> Result<Order, OrderManagementError>;
    }
    impl SellerManagement for Marketplace {
        async fn fetch_seller(&self, id: &UserId) -> Result<Option<Seller>, SellerManagementError>;
        async fn record_seller_activity(&self, id: &UserId, at: DateTime<Utc>) -> Result<Seller, SellerManagementError>;
        async fn lock_inactive_sellers(&self, cutoff: DateTime<Utc>, fee: Cents, reason: &str) -> Result<Vec<Seller>, SellerManagementError>;
    }
}

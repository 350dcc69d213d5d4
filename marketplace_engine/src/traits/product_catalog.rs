use thiserror::Error;

use crate::{
    db_types::{Cents, NewProduct, Product, ProductId, ProductUpdate, UserId},
    product_objects::ProductQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("The product update was empty")]
    EmptyUpdate,
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// The `ProductCatalog` trait defines behaviour for storing and retrieving products.
///
/// Backends return products exactly as stored. Special-price reconciliation is the responsibility of the caller
/// (see [`crate::ProductApi`]), which uses [`ProductCatalog::revert_special_price`] to persist its corrections.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn fetch_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    async fn fetch_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Applies a partial update to a product owned by `seller`. Only the fields present in `update` are written.
    /// Returns `None` if no product with that id belongs to the seller.
    async fn update_product(
        &self,
        id: &ProductId,
        seller: &UserId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, CatalogError>;

    /// Deletes a product owned by `seller`. Returns `false` if there was nothing to delete.
    async fn delete_product(&self, id: &ProductId, seller: &UserId) -> Result<bool, CatalogError>;

    /// Sets the price to `restored_price` and clears all special-price fields, but only while the stored product
    /// still carries a special that has already ended. Returns `false` if nothing was written, e.g. because the
    /// reversal was already applied or the seller has since started a new special.
    async fn revert_special_price(&self, id: &ProductId, restored_price: Cents) -> Result<bool, CatalogError>;
}

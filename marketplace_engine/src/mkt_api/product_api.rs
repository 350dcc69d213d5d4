use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductId, ProductUpdate, UserId},
    events::{EventProducers, SpecialPriceExpiredEvent},
    mkt_api::errors::ProductApiError,
    product_objects::ProductQueryFilter,
    traits::{CatalogError, ProductCatalog},
};

/// Reverts a lapsed special on `product`, persisting the correction before handing the product back.
///
/// Products whose special is still running (or that are not on special at all) are returned untouched, so calling
/// this on every read is safe. The reversal is only written while the stored product still has a lapsed special. If
/// the write does not apply, another request got there first (or the seller started a new special), and the stored
/// product is returned instead of the stale copy.
pub(crate) async fn reconcile_special_price<B: ProductCatalog>(
    db: &B,
    producers: &EventProducers,
    mut product: Product,
) -> Result<Product, CatalogError> {
    let now = Utc::now();
    let Some(restored) = product.expired_special_reversal(now) else {
        return Ok(product);
    };
    let special_price = product.price;
    if !db.revert_special_price(&product.id, restored).await? {
        trace!("🏷️ Product {} changed since it was read. Using the stored copy", product.id);
        return db.fetch_product(&product.id).await?.ok_or_else(|| CatalogError::ProductNotFound(product.id.clone()));
    }
    product.revert_special(restored, now);
    debug!("🏷️ Special on product {} ended. Price restored from {special_price} to {restored}", product.id);
    producers.publish_special_expired(SpecialPriceExpiredEvent::new(special_price, product.clone())).await;
    Ok(product)
}

/// `ProductApi` serves product reads, always with lapsed specials reverted, and lets sellers manage their own
/// listings.
pub struct ProductApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi")
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> ProductApi<B>
where B: ProductCatalog
{
    pub async fn reconcile(&self, product: Product) -> Result<Product, ProductApiError> {
        Ok(reconcile_special_price(&self.db, &self.producers, product).await?)
    }

    async fn reconcile_all(&self, products: Vec<Product>) -> Result<Vec<Product>, ProductApiError> {
        let mut result = Vec::with_capacity(products.len());
        for product in products {
            result.push(self.reconcile(product).await?);
        }
        Ok(result)
    }

    /// Fetches a product by its id, reconciling its price on the way out.
    pub async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductApiError> {
        match self.db.fetch_product(id).await? {
            Some(p) => Ok(Some(self.reconcile(p).await?)),
            None => Ok(None),
        }
    }

    /// A single product as shown in the shop. Products that are sold out are treated as not found.
    pub async fn shop_product(&self, id: &str) -> Result<Product, ProductApiError> {
        let pid = id.parse::<ProductId>().map_err(|e| ProductApiError::InvalidIdentity(e.0))?;
        let product = self
            .product_by_id(&pid)
            .await?
            .filter(Product::is_in_stock)
            .ok_or_else(|| ProductApiError::ProductNotFound(pid.to_string()))?;
        Ok(product)
    }

    /// Every product that is currently in stock.
    pub async fn shop_products(&self) -> Result<Vec<Product>, ProductApiError> {
        let products = self.db.fetch_products(ProductQueryFilter::default().in_stock_only()).await?;
        trace!("🏷️ {} products in stock", products.len());
        self.reconcile_all(products).await
    }

    /// The seller's own listings, newest first, including sold-out products.
    pub async fn seller_products(&self, seller: &UserId) -> Result<Vec<Product>, ProductApiError> {
        let filter = ProductQueryFilter::default().with_seller_id(seller.clone()).newest_first();
        let products = self.db.fetch_products(filter).await?;
        self.reconcile_all(products).await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, ProductApiError> {
        product.validate().map_err(ProductApiError::ValidationFailed)?;
        let product = self.db.insert_product(product).await?;
        info!("🏷️ Seller {} listed product {} ({})", product.seller_id, product.id, product.name);
        self.reconcile(product).await
    }

    /// Applies a partial update to one of the seller's products. The merged result must satisfy the same rules as a
    /// new listing.
    pub async fn update_product(
        &self,
        seller: &UserId,
        id: &str,
        update: ProductUpdate,
    ) -> Result<Product, ProductApiError> {
        let pid = id.parse::<ProductId>().map_err(|e| ProductApiError::InvalidIdentity(e.0))?;
        let existing = self
            .db
            .fetch_product(&pid)
            .await?
            .filter(|p| &p.seller_id == seller)
            .ok_or_else(|| ProductApiError::ProductNotFound(pid.to_string()))?;
        update.validate_against(&existing).map_err(ProductApiError::ValidationFailed)?;
        let product = self
            .db
            .update_product(&pid, seller, update)
            .await?
            .ok_or_else(|| ProductApiError::ProductNotFound(pid.to_string()))?;
        debug!("🏷️ Product {pid} updated by seller {seller}");
        self.reconcile(product).await
    }

    pub async fn delete_product(&self, seller: &UserId, id: &str) -> Result<(), ProductApiError> {
        let pid = id.parse::<ProductId>().map_err(|e| ProductApiError::InvalidIdentity(e.0))?;
        if self.db.delete_product(&pid, seller).await? {
            info!("🏷️ Product {pid} deleted by seller {seller}");
            Ok(())
        } else {
            Err(ProductApiError::ProductNotFound(pid.to_string()))
        }
    }
}

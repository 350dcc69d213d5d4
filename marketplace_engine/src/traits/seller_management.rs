use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{Cents, Seller, UserId};

#[derive(Debug, Clone, Error)]
pub enum SellerManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for SellerManagementError {
    fn from(e: sqlx::Error) -> Self {
        SellerManagementError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait SellerManagement {
    async fn fetch_seller(&self, id: &UserId) -> Result<Option<Seller>, SellerManagementError>;

    /// Creates the seller record if it does not exist yet, and sets `last_active` to `at`.
    async fn record_seller_activity(&self, id: &UserId, at: DateTime<Utc>) -> Result<Seller, SellerManagementError>;

    /// Locks every active seller whose last activity is strictly before `cutoff`, recording the fee they must pay to
    /// be reinstated and the reason for the lock. Returns the sellers that were locked by this call.
    async fn lock_inactive_sellers(
        &self,
        cutoff: DateTime<Utc>,
        fee: Cents,
        reason: &str,
    ) -> Result<Vec<Seller>, SellerManagementError>;
}

use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    db_types::{Cents, Seller, UserId},
    events::{EventProducers, SellerLockedEvent},
    mkt_api::errors::SellerApiError,
    traits::SellerManagement,
};

pub const DEFAULT_INACTIVITY_DAYS: i64 = 60;
pub const DEFAULT_REACTIVATION_FEE: Cents = Cents::from_units(150);

/// When a seller is considered dormant, and what it costs them to come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerPolicy {
    pub inactivity_period: Duration,
    pub reactivation_fee: Cents,
}

impl Default for SellerPolicy {
    fn default() -> Self {
        Self { inactivity_period: Duration::days(DEFAULT_INACTIVITY_DAYS), reactivation_fee: DEFAULT_REACTIVATION_FEE }
    }
}

impl SellerPolicy {
    pub fn new(inactivity_period: Duration, reactivation_fee: Cents) -> Self {
        Self { inactivity_period, reactivation_fee }
    }

    pub fn lock_reason(&self) -> String {
        format!("Automatic lock due to {} days of inactivity.", self.inactivity_period.num_days())
    }
}

/// `SellerApi` tracks seller activity and locks sellers that have been dormant for longer than the policy allows.
pub struct SellerApi<B> {
    db: B,
    policy: SellerPolicy,
    producers: EventProducers,
}

impl<B> Debug for SellerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SellerApi ({:?})", self.policy)
    }
}

impl<B> SellerApi<B> {
    pub fn new(db: B, policy: SellerPolicy, producers: EventProducers) -> Self {
        Self { db, policy, producers }
    }

    pub fn policy(&self) -> &SellerPolicy {
        &self.policy
    }
}

impl<B> SellerApi<B>
where B: SellerManagement
{
    /// Marks the seller as active now. Locked sellers are refused.
    pub async fn record_activity(&self, seller: &UserId) -> Result<Seller, SellerApiError> {
        let record = self.db.record_seller_activity(seller, Utc::now()).await?;
        if record.is_locked() {
            debug!("🕰️ Locked seller {seller} attempted to use the seller dashboard");
            let reason = record.deactivation_reason.clone().unwrap_or_default();
            return Err(SellerApiError::SellerLocked { seller: seller.clone(), reason });
        }
        Ok(record)
    }

    pub async fn seller(&self, seller: &UserId) -> Result<Option<Seller>, SellerApiError> {
        Ok(self.db.fetch_seller(seller).await?)
    }

    /// Locks every active seller whose last activity is older than the inactivity period, measured back from `now`.
    pub async fn lock_inactive_sellers(&self, now: DateTime<Utc>) -> Result<Vec<Seller>, SellerApiError> {
        let cutoff = now - self.policy.inactivity_period;
        let reason = self.policy.lock_reason();
        let locked = self.db.lock_inactive_sellers(cutoff, self.policy.reactivation_fee, &reason).await?;
        for seller in &locked {
            info!("🕰️ Seller {} locked. Last active {}", seller.id, seller.last_active);
            self.producers.publish_seller_locked(SellerLockedEvent::new(seller.clone())).await;
        }
        Ok(locked)
    }
}

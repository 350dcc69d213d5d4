use chrono::Utc;
use log::*;
use marketplace_engine::{db_types::Seller, events::EventProducers, SellerApi, SellerPolicy, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the seller lock worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The first run happens immediately, then once every `interval`.
pub fn start_lock_worker(
    db: SqliteDatabase,
    policy: SellerPolicy,
    producers: EventProducers,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = SellerApi::new(db, policy, producers);
        info!("🕰️ Seller lock worker started. {}", api.policy().lock_reason());
        loop {
            timer.tick().await;
            debug!("🕰️ Running seller inactivity lock job");
            match api.lock_inactive_sellers(Utc::now()).await {
                Ok(locked) if locked.is_empty() => debug!("🕰️ No dormant sellers found"),
                Ok(locked) => info!("🕰️ {} sellers locked: {}", locked.len(), seller_list(&locked)),
                Err(e) => error!("🕰️ Error running seller inactivity lock job: {e}"),
            }
        }
    })
}

fn seller_list(sellers: &[Seller]) -> String {
    sellers.iter().map(|s| format!("[{}] last active {}", s.id, s.last_active)).collect::<Vec<String>>().join(", ")
}

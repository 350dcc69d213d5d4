use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use super::first_returned;
use crate::db_types::{Cents, Seller, SellerStatus, UserId};

pub async fn fetch_seller(id: &UserId, conn: &mut SqliteConnection) -> Result<Option<Seller>, sqlx::Error> {
    let seller = sqlx::query_as("SELECT * FROM sellers WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(seller)
}

/// Creates the seller on first sight, and moves `last_active` forward to `at` otherwise. The status of an existing
/// seller is left alone, so activity never unlocks a locked account.
pub async fn upsert_activity(
    id: &UserId,
    at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Seller, sqlx::Error> {
    let rows: Vec<Seller> = sqlx::query_as(
        r#"
        INSERT INTO sellers (id, status, last_active, created_at, updated_at)
        VALUES ($1, $2, $3, $3, $3)
        ON CONFLICT (id) DO UPDATE SET
            last_active = MAX(sellers.last_active, excluded.last_active),
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(id.as_str())
    .bind(SellerStatus::Active.to_string())
    .bind(at)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ Activity recorded for seller {id}");
    first_returned(rows)
}

pub async fn lock_inactive(
    cutoff: DateTime<Utc>,
    fee: Cents,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Seller>, sqlx::Error> {
    let sellers = sqlx::query_as(
        r#"
        UPDATE sellers SET
            status = $1,
            reactivation_fee_owed = $2,
            deactivation_reason = $3,
            updated_at = $4
        WHERE status = $5 AND last_active < $6
        RETURNING *
        "#,
    )
    .bind(SellerStatus::Locked.to_string())
    .bind(fee)
    .bind(reason)
    .bind(Utc::now())
    .bind(SellerStatus::Active.to_string())
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    Ok(sellers)
}

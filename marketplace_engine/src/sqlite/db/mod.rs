//! # SQLite Database methods
//!
//! Low-level SQLite interactions. Every function accepts a `&mut SqliteConnection`, so callers can pass a pooled
//! connection or `&mut *tx` for an open transaction without any other changes.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod orders;
pub mod products;
pub mod sellers;

const SQLITE_DB_URL: &str = "sqlite://data/marketplace.db";

pub fn db_url() -> String {
    let result = env::var("MKT_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ MKT_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Takes the single row of a write with `RETURNING`. SQLite only finishes the write, and commits it when no
/// transaction is open, once the statement has been stepped to the end, so such writes are read with `fetch_all`.
pub(crate) fn first_returned<T>(rows: Vec<T>) -> Result<T, SqlxError> {
    rows.into_iter().next().ok_or(SqlxError::RowNotFound)
}

//! Throwaway SQLite databases for tests.
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Loads `.env.test` and starts logging. Every test may call this.
pub fn init_test_logging() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
}

/// A database URL under the system temp directory. Every call names a new file, so parallel tests never share state.
pub fn random_db_url() -> String {
    let file = format!("mkt_test_{:016x}.db", rand::random::<u64>());
    format!("sqlite://{}", std::env::temp_dir().join(file).display())
}

/// Creates an empty database at `url`, replacing any leftover file, and brings its schema up to date.
pub async fn create_migrated_database(url: &str) -> SqliteDatabase {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        trace!("🗃️ Replacing leftover test database {url}");
        Sqlite::drop_database(url).await.expect("Could not drop stale test database");
    }
    Sqlite::create_database(url).await.expect("Could not create test database");
    let db = SqliteDatabase::new_with_url(url, 25).await.expect("Could not connect to test database");
    db.migrate().await.expect("Could not migrate test database");
    debug!("🗃️ Test database ready at {url}");
    db
}

pub async fn fresh_database() -> SqliteDatabase {
    init_test_logging();
    create_migrated_database(&random_db_url()).await
}

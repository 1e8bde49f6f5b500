use std::str::FromStr;

use shared::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};

pub mod model;

// SQLITE_BUSY and SQLITE_LOCKED; extended codes share the low byte
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

fn make_sqlite_connect_options(cfg: &DatabaseConfig) -> AppResult<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(&cfg.url)
        .map_err(AppError::SpecificOperationError)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(cfg.busy_timeout))
}

#[derive(Clone)]
pub struct ConnectionPool(SqlitePool);

impl ConnectionPool {
    pub fn new(pool: SqlitePool) -> Self {
        Self(pool)
    }

    pub fn inner_ref(&self) -> &SqlitePool {
        &self.0
    }

    /// Opens a write transaction. `BEGIN IMMEDIATE` takes the database write
    /// lock up front, so waiting happens in the busy handler instead of
    /// failing a later read-to-write upgrade.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.0
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_commit_error)
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.0)
            .await
            .map_err(|e| AppError::SpecificOperationError(sqlx::Error::Migrate(Box::new(e))))
    }
}

pub fn connect_database_with(cfg: &DatabaseConfig) -> AppResult<ConnectionPool> {
    let options = make_sqlite_connect_options(cfg)?;
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.busy_timeout)
        .connect_lazy_with(options);
    Ok(ConnectionPool(pool))
}

/// Maps a failed statement inside a booking transaction. Lock contention
/// becomes [`AppError::Conflict`] so callers can retry; anything else is an
/// internal failure.
pub fn map_write_error(e: sqlx::Error) -> AppError {
    if is_contention(&e) {
        tracing::warn!(error.message = %e, "database lock contention");
        return AppError::Conflict("the resource is being modified, retry later".into());
    }
    AppError::SpecificOperationError(e)
}

pub fn map_commit_error(e: sqlx::Error) -> AppError {
    if is_contention(&e) {
        return map_write_error(e);
    }
    AppError::TransactionError(e)
}

fn is_contention(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}

use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, Result};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub lock: LockConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://hotel.db?mode=rwc".into()),
            max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            busy_timeout: Duration::from_millis(var_or("DATABASE_BUSY_TIMEOUT_MS", 5_000)?),
        };
        let lock = LockConfig {
            wait: Duration::from_millis(var_or("LOCK_WAIT_MS", 3_000)?),
        };
        let server = ServerConfig {
            port: var_or("APP_PORT", 8080)?,
        };
        Ok(Self {
            database,
            lock,
            server,
        })
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

#[derive(Clone, Copy)]
pub struct LockConfig {
    /// Upper bound on how long a caller waits for a room or slot lock.
    pub wait: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(3),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ServerConfig {
    pub port: u16,
}

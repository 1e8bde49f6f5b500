use std::{
    collections::HashMap,
    fmt::{self, Display},
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDate;
use itertools::Itertools;
use kernel::model::id::ServiceId;
use shared::{
    config::LockConfig,
    error::{AppError, AppResult},
};
use tokio::{
    sync::{Mutex as AsyncMutex, OwnedMutexGuard},
    time::{timeout_at, Instant},
};

/// Capacity of one service on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub service_id: ServiceId,
    pub service_date: NaiveDate,
}

impl Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service ({}) on {}", self.service_id, self.service_date)
    }
}

// Keys are taken in ascending order; a wait past `LockConfig::wait` is a `Conflict`.
pub struct LockTable<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
    config: LockConfig,
}

/// Guards held for the duration of one booking transaction.
#[must_use]
pub struct LockSet {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl<K> LockTable<K>
where
    K: Ord + Hash + Clone + Display,
{
    pub fn new(config: LockConfig) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub async fn acquire_all(&self, keys: impl IntoIterator<Item = K>) -> AppResult<LockSet> {
        let deadline = Instant::now() + self.config.wait;
        let mut guards = Vec::new();
        for key in keys.into_iter().sorted().dedup() {
            let slot = self.slot(&key);
            match timeout_at(deadline, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    tracing::warn!(%key, wait = ?self.config.wait, "lock wait exceeded");
                    return Err(AppError::Conflict(format!(
                        "{key} is locked by another booking, retry later"
                    )));
                }
            }
        }
        Ok(LockSet { _guards: guards })
    }

    pub async fn acquire(&self, key: K) -> AppResult<LockSet> {
        self.acquire_all([key]).await
    }

    fn slot(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // entries nobody holds or waits on are dropped so the table stays small
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(key.clone()).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

mod inmemory;
mod postgres;

pub use inmemory::InMemorySettingsRepo;
pub use postgres::PostgresSettingsRepo;

use rappel_scheduler_domain::PluginSettings;

/// The rappel settings record of the host settings store
#[async_trait::async_trait]
pub trait ISettingsRepo: Send + Sync {
    async fn get(&self) -> anyhow::Result<PluginSettings>;
    /// Writes a single key, leaving the rest of the record as it is
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// The job lock kept in the rappel settings record
#[async_trait::async_trait]
pub trait IJobLockRepo: Send + Sync {
    /// Takes the lock if it is free or was taken `stale_window_secs` or more
    /// seconds ago. Returns whether the lock was taken.
    async fn try_acquire(&self, now_secs: i64, stale_window_secs: i64) -> anyhow::Result<bool>;
    /// Frees the lock whoever holds it
    async fn release(&self) -> anyhow::Result<()>;
}

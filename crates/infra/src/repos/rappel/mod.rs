mod inmemory;
mod postgres;

pub use inmemory::InMemoryRappelRepo;
pub use postgres::PostgresRappelRepo;

use chrono::{DateTime, Utc};
use rappel_scheduler_domain::{Rappel, ID};

#[async_trait::async_trait]
pub trait IRappelRepo: Send + Sync {
    async fn insert(&self, rappel: &Rappel) -> anyhow::Result<()>;
    async fn save(&self, rappel: &Rappel) -> anyhow::Result<()>;
    async fn find(&self, rappel_id: &ID) -> Option<Rappel>;
    /// All the `Rappel`s without a `next_run_date` or with one at or before `now`
    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Rappel>>;
}

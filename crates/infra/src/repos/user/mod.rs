mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

use rappel_scheduler_domain::{User, ID};

/// Read model over the users of the host issue tracker
#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    /// Finds the `User`s with the given ids. Ids that do not belong to a
    /// `User` (missing or a group) are left out of the result.
    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>>;
}

mod inmemory;
mod postgres;

pub use inmemory::InMemoryIssueRepo;
pub use postgres::PostgresIssueRepo;

use rappel_scheduler_domain::{Issue, ID};

/// Read model over the issues of the host issue tracker
#[async_trait::async_trait]
pub trait IIssueRepo: Send + Sync {
    async fn insert(&self, issue: &Issue) -> anyhow::Result<()>;
    /// Finds the `Issue` together with its status and watchers.
    /// `Ok(None)` means the `Issue` does not exist.
    async fn find(&self, issue_id: &ID) -> anyhow::Result<Option<Issue>>;
}

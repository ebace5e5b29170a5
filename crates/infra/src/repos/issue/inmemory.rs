use super::IIssueRepo;
use crate::repos::shared::inmemory_repo::*;
use rappel_scheduler_domain::{Issue, ID};

pub struct InMemoryIssueRepo {
    issues: std::sync::Mutex<Vec<Issue>>,
}

impl InMemoryIssueRepo {
    pub fn new() -> Self {
        Self {
            issues: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IIssueRepo for InMemoryIssueRepo {
    async fn insert(&self, issue: &Issue) -> anyhow::Result<()> {
        insert(issue, &self.issues);
        Ok(())
    }

    async fn find(&self, issue_id: &ID) -> anyhow::Result<Option<Issue>> {
        Ok(find(issue_id, &self.issues))
    }
}

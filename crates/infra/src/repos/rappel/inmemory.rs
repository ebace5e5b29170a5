use super::IRappelRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use rappel_scheduler_domain::{Rappel, ID};

pub struct InMemoryRappelRepo {
    rappels: std::sync::Mutex<Vec<Rappel>>,
}

impl InMemoryRappelRepo {
    pub fn new() -> Self {
        Self {
            rappels: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IRappelRepo for InMemoryRappelRepo {
    async fn insert(&self, rappel: &Rappel) -> anyhow::Result<()> {
        insert(rappel, &self.rappels);
        Ok(())
    }

    async fn save(&self, rappel: &Rappel) -> anyhow::Result<()> {
        save(rappel, &self.rappels);
        Ok(())
    }

    async fn find(&self, rappel_id: &ID) -> Option<Rappel> {
        find(rappel_id, &self.rappels)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Rappel>> {
        let mut rappels = find_by(&self.rappels, |r| r.is_due(now));
        rappels.sort_by_key(|r| r.id);
        Ok(rappels)
    }
}

use super::{IJobLockRepo, ISettingsRepo};
use rappel_scheduler_domain::{PluginSettings, JOB_LOCKED_KEY, LOCK_TIMESTAMP_KEY};
use std::collections::BTreeMap;

pub struct InMemorySettingsRepo {
    values: std::sync::Mutex<BTreeMap<String, String>>,
}

impl InMemorySettingsRepo {
    pub fn new() -> Self {
        Self {
            values: std::sync::Mutex::new(BTreeMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISettingsRepo for InMemorySettingsRepo {
    async fn get(&self) -> anyhow::Result<PluginSettings> {
        let values = self.values.lock().unwrap();
        Ok(PluginSettings::from_map(values.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait::async_trait]
impl IJobLockRepo for InMemorySettingsRepo {
    async fn try_acquire(&self, now_secs: i64, stale_window_secs: i64) -> anyhow::Result<bool> {
        let mut values = self.values.lock().unwrap();
        let mut job_lock = PluginSettings::from_map(values.clone()).job_lock;
        if !job_lock.try_acquire(now_secs, stale_window_secs) {
            return Ok(false);
        }
        values.insert(JOB_LOCKED_KEY.into(), job_lock.locked.to_string());
        values.insert(
            LOCK_TIMESTAMP_KEY.into(),
            job_lock.lock_timestamp.to_string(),
        );
        Ok(true)
    }

    async fn release(&self) -> anyhow::Result<()> {
        let mut values = self.values.lock().unwrap();
        values.insert(JOB_LOCKED_KEY.into(), false.to_string());
        Ok(())
    }
}

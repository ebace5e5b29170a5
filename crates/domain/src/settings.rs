use std::collections::BTreeMap;

/// Name of the settings record that holds the rappel options and the job lock
pub const PLUGIN_SETTINGS_NAME: &str = "plugin_rappel";

// Keys of the settings record. Existing deployments depend on these names.
pub const OVERDUE_ONLY_KEY: &str = "overdue_only";
pub const JOB_LOCKED_KEY: &str = "job_locked";
pub const LOCK_TIMESTAMP_KEY: &str = "lock_timestamp";
pub const SERVER_INSTANCE_ID_KEY: &str = "server_instance_id";

/// Lock that keeps the rappel job from running in more than one
/// process at a time.
///
/// A held lock older than the staleness window is considered abandoned
/// (e.g. the holder crashed) and can be taken over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobLock {
    pub locked: bool,
    /// Epoch seconds of the last acquisition
    pub lock_timestamp: i64,
}

impl JobLock {
    pub fn is_stale(&self, now_secs: i64, stale_window_secs: i64) -> bool {
        now_secs.saturating_sub(self.lock_timestamp) >= stale_window_secs
    }

    /// Held by a live process
    pub fn is_held(&self, now_secs: i64, stale_window_secs: i64) -> bool {
        self.locked && !self.is_stale(now_secs, stale_window_secs)
    }

    /// Takes the lock if it is free or stale
    pub fn try_acquire(&mut self, now_secs: i64, stale_window_secs: i64) -> bool {
        if self.is_held(now_secs, stale_window_secs) {
            return false;
        }
        self.locked = true;
        self.lock_timestamp = now_secs;
        true
    }

    pub fn release(&mut self) {
        self.locked = false;
    }
}

/// The rappel settings record of the host settings store.
///
/// The store keeps every value as a string, `to_map` and `from_map` convert
/// between that representation and the typed one. Keys not known here are
/// kept untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginSettings {
    /// Only send rappels for issues past their due date
    pub overdue_only: bool,
    pub job_lock: JobLock,
    /// Marker of the server instance which scheduled the rappel job
    pub server_instance_id: Option<String>,
    pub other: BTreeMap<String, String>,
}

impl PluginSettings {
    pub fn from_map<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Self::default();
        for (key, value) in values {
            match key.as_str() {
                OVERDUE_ONLY_KEY => settings.overdue_only = value.trim() == "1",
                JOB_LOCKED_KEY => settings.job_lock.locked = value.trim() == "true",
                LOCK_TIMESTAMP_KEY => {
                    settings.job_lock.lock_timestamp = value.trim().parse().unwrap_or(0)
                }
                SERVER_INSTANCE_ID_KEY => {
                    if !value.is_empty() {
                        settings.server_instance_id = Some(value)
                    }
                }
                _ => {
                    settings.other.insert(key, value);
                }
            }
        }
        settings
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut values = self.other.clone();
        values.insert(
            OVERDUE_ONLY_KEY.into(),
            if self.overdue_only { "1" } else { "0" }.into(),
        );
        values.insert(JOB_LOCKED_KEY.into(), self.job_lock.locked.to_string());
        values.insert(
            LOCK_TIMESTAMP_KEY.into(),
            self.job_lock.lock_timestamp.to_string(),
        );
        if let Some(server_instance_id) = &self.server_instance_id {
            values.insert(SERVER_INSTANCE_ID_KEY.into(), server_instance_id.clone());
        }
        values
    }
}

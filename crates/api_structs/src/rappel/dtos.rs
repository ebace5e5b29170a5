use chrono::{DateTime, Utc};
use rappel_scheduler_domain::{CycleOutcome, JobLock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLockDTO {
    pub locked: bool,
    pub lock_timestamp: i64,
    /// Held for longer than the staleness window and free to be taken over
    pub stale: bool,
}

impl JobLockDTO {
    pub fn new(job_lock: JobLock, now_secs: i64, stale_window_secs: i64) -> Self {
        Self {
            locked: job_lock.locked,
            lock_timestamp: job_lock.lock_timestamp,
            stale: job_lock.locked && job_lock.is_stale(now_secs, stale_window_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcomeDTO {
    /// `completed`, `lockBusy` or `failed`
    pub outcome: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub due: usize,
    pub skipped: usize,
    pub without_recipients: usize,
    pub sent: usize,
    pub failed: usize,
    #[serde(default)]
    pub error: Option<String>,
}

impl CycleOutcomeDTO {
    pub fn new(outcome: &CycleOutcome) -> Self {
        let mut dto = Self {
            outcome: outcome.label().to_string(),
            started_at: None,
            due: 0,
            skipped: 0,
            without_recipients: 0,
            sent: 0,
            failed: 0,
            error: None,
        };
        match outcome {
            CycleOutcome::Completed(report) => {
                dto.started_at = Some(report.started_at);
                dto.due = report.due;
                dto.skipped = report.skipped;
                dto.without_recipients = report.without_recipients;
                dto.sent = report.sent;
                dto.failed = report.failed;
            }
            CycleOutcome::Failed(error) => dto.error = Some(error.clone()),
            CycleOutcome::LockBusy => (),
        }
        dto
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RappelSettingsDTO {
    pub overdue_only: bool,
}

use chrono::{DateTime, Utc};

/// Counts of what happened to the due `Rappel`s in one run of the rappel job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// `Rappel`s that were due when the run started
    pub due: usize,
    /// `Rappel`s left out by the selection (missing or closed issue, not overdue)
    pub skipped: usize,
    /// `Rappel`s with no eligible recipient
    pub without_recipients: usize,
    /// `Rappel`s sent to all of their recipients, their schedule was advanced
    pub sent: usize,
    /// `Rappel`s with at least one failed recipient or a failed lookup
    pub failed: usize,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ..Default::default()
        }
    }
}

/// How one run of the rappel job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another process holds the job lock, nothing was done
    LockBusy,
    Completed(CycleReport),
    /// The run was aborted, e.g. the due `Rappel`s could not be queried
    Failed(String),
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LockBusy => "lockBusy",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

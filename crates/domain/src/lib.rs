mod issue;
mod job;
mod rappel;
mod settings;
mod shared;
mod user;

pub use issue::{Issue, IssueStatus, Watcher, CLOSED_STATUS_KEYWORDS};
pub use job::{CycleOutcome, CycleReport};
pub use rappel::Rappel;
pub use settings::{
    JobLock, PluginSettings, JOB_LOCKED_KEY, LOCK_TIMESTAMP_KEY, OVERDUE_ONLY_KEY,
    PLUGIN_SETTINGS_NAME, SERVER_INSTANCE_ID_KEY,
};
pub use shared::entity::{Entity, ID};
pub use shared::recurrence::{InvalidFrequencyError, RappelFrequency};
pub use user::User;

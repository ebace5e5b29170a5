use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;

/// Status names that mean the issue no longer needs attention, even when the
/// tracker has not flagged the status as closed. Installations often use
/// custom or translated status names, so this covers English and French.
pub const CLOSED_STATUS_KEYWORDS: [&str; 12] = [
    "resolved",
    "rejected",
    "closed",
    "done",
    "completed",
    "fixed",
    "résolu",
    "fermé",
    "terminé",
    "rejeté",
    "clôturé",
    "fini",
];

/// An `Issue` of the host issue tracker that a `Rappel` is attached to.
/// This is read-only for the rappel scheduler.
#[derive(Debug, Clone)]
pub struct Issue {
    pub id: ID,
    pub subject: String,
    pub status: IssueStatus,
    pub due_date: Option<NaiveDate>,
    pub assigned_to_id: Option<ID>,
    pub author_id: Option<ID>,
    pub watchers: Vec<Watcher>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueStatus {
    pub id: ID,
    pub name: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Watcher {
    pub user_id: ID,
}

impl IssueStatus {
    /// Either flagged as closed by the tracker or named like a closed status
    pub fn is_closed_or_resolved(&self) -> bool {
        if self.is_closed {
            return true;
        }
        let name = self.name.to_lowercase();
        CLOSED_STATUS_KEYWORDS
            .iter()
            .any(|keyword| name.contains(keyword))
    }
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.status.is_closed_or_resolved()
    }

    /// `true` when the issue has a due date which is today or earlier.
    /// Issues without a due date are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due_date) => due_date <= now.date_naive(),
            None => false,
        }
    }

    /// Ids of everybody with a stake in the issue: the assignee, the author and
    /// all the watchers, in that order and without duplicates.
    pub fn stakeholder_ids(&self) -> Vec<ID> {
        self.assigned_to_id
            .iter()
            .chain(self.author_id.iter())
            .chain(self.watchers.iter().map(|w| &w.user_id))
            .copied()
            .unique()
            .collect()
    }
}

impl Entity for Issue {
    fn id(&self) -> ID {
        self.id
    }
}

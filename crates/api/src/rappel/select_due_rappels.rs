use super::RappelError;
use crate::shared::usecase::UseCase;
use chrono::{DateTime, Utc};
use rappel_scheduler_domain::{Issue, Rappel, ID};
use rappel_scheduler_infra::RappelContext;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a due `Rappel` is not sent in this run
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    IssueNotFound(ID),
    IssueClosed { status: String },
    NotOverdue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IssueNotFound(id) => write!(f, "issue {} was not found", id),
            Self::IssueClosed { status } => write!(f, "issue is closed (status: {})", status),
            Self::NotOverdue => write!(f, "issue is not overdue"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Unable to query the due rappels: {0}")]
    Query(anyhow::Error),
    #[error("Unable to read the rappel settings: {0}")]
    Settings(anyhow::Error),
}

/// A due `Rappel` together with its `Issue`
#[derive(Debug, Clone)]
pub struct DueRappel {
    pub rappel: Rappel,
    pub issue: Issue,
}

#[derive(Debug, Default)]
pub struct Selection {
    /// Number of `Rappel`s that were due
    pub due: usize,
    pub selected: Vec<DueRappel>,
    pub skipped: Vec<(ID, SkipReason)>,
    pub failed: Vec<(ID, RappelError)>,
}

/// Decides whether a due `Rappel` about `issue` should be sent
pub fn skip_reason(issue: &Issue, overdue_only: bool, now: DateTime<Utc>) -> Option<SkipReason> {
    if overdue_only && !issue.is_overdue(now) {
        return Some(SkipReason::NotOverdue);
    }
    if issue.is_closed() {
        return Some(SkipReason::IssueClosed {
            status: issue.status.name.clone(),
        });
    }
    None
}

/// Finds the `Rappel`s that should be sent at `now`
#[derive(Debug)]
pub struct SelectDueRappelsUseCase {
    pub now: DateTime<Utc>,
    /// Only keep `Rappel`s about overdue issues
    pub overdue_only: bool,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SelectDueRappelsUseCase {
    type Response = Selection;

    type Errors = SelectionError;

    async fn execute(&mut self, ctx: &RappelContext) -> Result<Self::Response, Self::Errors> {
        let candidates = ctx
            .repos
            .rappels
            .find_due(self.now)
            .await
            .map_err(SelectionError::Query)?;
        info!("Found {} due rappel(s)", candidates.len());

        let mut selection = Selection {
            due: candidates.len(),
            ..Default::default()
        };
        for rappel in candidates {
            let issue = match ctx.repos.issues.find(&rappel.issue_id).await {
                Ok(Some(issue)) => issue,
                Ok(None) => {
                    let reason = SkipReason::IssueNotFound(rappel.issue_id);
                    info!("Skipping rappel {}: {}", rappel.id, reason);
                    selection.skipped.push((rappel.id, reason));
                    continue;
                }
                Err(e) => {
                    let error = RappelError::IssueLookup(e);
                    warn!("Skipping rappel {}: {}", rappel.id, error);
                    selection.failed.push((rappel.id, error));
                    continue;
                }
            };

            if let Some(reason) = skip_reason(&issue, self.overdue_only, self.now) {
                debug!("Skipping rappel {}: {}", rappel.id, reason);
                selection.skipped.push((rappel.id, reason));
                continue;
            }
            selection.selected.push(DueRappel { rappel, issue });
        }

        Ok(selection)
    }
}

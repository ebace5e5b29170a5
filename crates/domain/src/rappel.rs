use crate::{
    shared::{
        entity::{Entity, ID},
        recurrence::RappelFrequency,
    },
    Issue,
};
use chrono::{DateTime, Utc};

const DEFAULT_TITLE_PREFIX: &str = "Rappel";

/// A `Rappel` is a recurring reminder attached to an `Issue`. Until the
/// `Issue` is closed, the stakeholders of the `Issue` are notified every
/// time the `Rappel` is due.
#[derive(Debug, Clone, PartialEq)]
pub struct Rappel {
    pub id: ID,
    /// The `Issue` this `Rappel` is about
    pub issue_id: ID,
    /// Optional subject template for the notification. Supports the
    /// `{issue_id}`, `{issue_subject}`, `{status}` and `{due_date}` placeholders.
    pub subject: Option<String>,
    pub frequency: RappelFrequency,
    /// Number of `frequency` periods between two notifications
    pub interval: u32,
    /// When the `Rappel` should fire next. `None` means it has never
    /// been sent and is due right away.
    pub next_run_date: Option<DateTime<Utc>>,
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl Rappel {
    pub fn new(id: ID, issue_id: ID) -> Self {
        Self {
            id,
            issue_id,
            subject: None,
            frequency: Default::default(),
            interval: 1,
            next_run_date: None,
            last_sent_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_run_date {
            Some(next_run_date) => next_run_date <= now,
            None => true,
        }
    }

    /// The subject used for the notification about the given `Issue`
    pub fn processed_title(&self, issue: &Issue) -> String {
        match self.subject.as_deref().map(str::trim) {
            Some(subject) if !subject.is_empty() => {
                let due_date = issue
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                subject
                    .replace("{issue_id}", &issue.id.to_string())
                    .replace("{issue_subject}", &issue.subject)
                    .replace("{status}", &issue.status.name)
                    .replace("{due_date}", &due_date)
            }
            _ => format!("{}: {}", DEFAULT_TITLE_PREFIX, issue.subject),
        }
    }

    /// Records that the notifications for this occurrence were sent and
    /// advances `next_run_date` to the next occurrence strictly after `now`.
    pub fn mark_as_sent(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let anchor = self.next_run_date.unwrap_or(now);
        let next_run_date = self
            .frequency
            .next_after(anchor, self.interval, now)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unable to compute the next run date of rappel {} from {}",
                    self.id,
                    anchor
                )
            })?;
        self.next_run_date = Some(next_run_date);
        self.last_sent_at = Some(now);
        Ok(())
    }
}

impl Entity for Rappel {
    fn id(&self) -> ID {
        self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IssueStatus;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn issue() -> Issue {
        Issue {
            id: ID::new(77),
            subject: "Renew the TLS certificate".into(),
            status: IssueStatus {
                id: ID::new(2),
                name: "In progress".into(),
                is_closed: false,
            },
            due_date: NaiveDate::from_ymd_opt(2021, 4, 1),
            assigned_to_id: None,
            author_id: None,
            watchers: vec![],
        }
    }

    #[test]
    fn is_due_when_unset_or_in_the_past() {
        let now = Utc.with_ymd_and_hms(2021, 4, 2, 10, 0, 0).unwrap();
        let mut rappel = Rappel::new(ID::new(1), ID::new(77));
        assert!(rappel.is_due(now));

        rappel.next_run_date = Some(now);
        assert!(rappel.is_due(now));

        rappel.next_run_date = Some(now - Duration::minutes(1));
        assert!(rappel.is_due(now));

        rappel.next_run_date = Some(now + Duration::seconds(1));
        assert!(!rappel.is_due(now));
    }

    #[test]
    fn processed_title_falls_back_to_issue_subject() {
        let mut rappel = Rappel::new(ID::new(1), ID::new(77));
        assert_eq!(
            rappel.processed_title(&issue()),
            "Rappel: Renew the TLS certificate"
        );

        rappel.subject = Some("  ".into());
        assert_eq!(
            rappel.processed_title(&issue()),
            "Rappel: Renew the TLS certificate"
        );
    }

    #[test]
    fn processed_title_fills_placeholders() {
        let mut rappel = Rappel::new(ID::new(1), ID::new(77));
        rappel.subject = Some("#{issue_id} {issue_subject} ({status}) due {due_date}".into());
        assert_eq!(
            rappel.processed_title(&issue()),
            "#77 Renew the TLS certificate (In progress) due 2021-04-01"
        );
    }

    #[test]
    fn mark_as_sent_advances_next_run_date() {
        let now = Utc.with_ymd_and_hms(2021, 4, 2, 10, 0, 0).unwrap();
        let mut rappel = Rappel::new(ID::new(1), ID::new(77));

        rappel.mark_as_sent(now).unwrap();
        assert_eq!(rappel.next_run_date, Some(now + Duration::days(1)));
        assert_eq!(rappel.last_sent_at, Some(now));

        // Sent a bit late, keeps the original time of day
        let late = now + Duration::days(1) + Duration::minutes(3);
        rappel.mark_as_sent(late).unwrap();
        assert_eq!(rappel.next_run_date, Some(now + Duration::days(2)));
        assert!(rappel.next_run_date.unwrap() > late);

        rappel.frequency = RappelFrequency::Weekly;
        rappel.interval = 2;
        let later = now + Duration::days(2);
        rappel.mark_as_sent(later).unwrap();
        assert_eq!(
            rappel.next_run_date,
            Some(now + Duration::days(2) + Duration::weeks(2))
        );
    }
}

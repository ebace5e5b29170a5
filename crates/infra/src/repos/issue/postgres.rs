use super::IIssueRepo;
use chrono::NaiveDate;
use rappel_scheduler_domain::{Issue, IssueStatus, Watcher, ID};
use sqlx::{FromRow, PgPool};

const WATCHABLE_TYPE_ISSUE: &str = "Issue";

pub struct PostgresIssueRepo {
    pool: PgPool,
}

impl PostgresIssueRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IssueRaw {
    id: i64,
    subject: String,
    due_date: Option<NaiveDate>,
    assigned_to_id: Option<i64>,
    author_id: Option<i64>,
    status_id: i64,
    status_name: String,
    status_is_closed: bool,
}

#[derive(Debug, FromRow)]
struct WatcherRaw {
    user_id: i64,
}

impl IssueRaw {
    fn into_issue(self, watchers: Vec<WatcherRaw>) -> Issue {
        Issue {
            id: self.id.into(),
            subject: self.subject,
            status: IssueStatus {
                id: self.status_id.into(),
                name: self.status_name,
                is_closed: self.status_is_closed,
            },
            due_date: self.due_date,
            assigned_to_id: self.assigned_to_id.map(ID::from),
            author_id: self.author_id.map(ID::from),
            watchers: watchers
                .into_iter()
                .map(|w| Watcher {
                    user_id: w.user_id.into(),
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl IIssueRepo for PostgresIssueRepo {
    async fn insert(&self, issue: &Issue) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO issue_statuses(id, name, is_closed)
            VALUES($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, is_closed = EXCLUDED.is_closed
            "#,
        )
        .bind(issue.status.id.inner())
        .bind(&issue.status.name)
        .bind(issue.status.is_closed)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO issues(id, subject, status_id, due_date, assigned_to_id, author_id)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(issue.id.inner())
        .bind(&issue.subject)
        .bind(issue.status.id.inner())
        .bind(issue.due_date)
        .bind(issue.assigned_to_id.map(|id| id.inner()))
        .bind(issue.author_id.map(|id| id.inner()))
        .execute(&mut *tx)
        .await?;

        for watcher in &issue.watchers {
            sqlx::query(
                r#"
                INSERT INTO watchers(watchable_type, watchable_id, user_id)
                VALUES($1, $2, $3)
                "#,
            )
            .bind(WATCHABLE_TYPE_ISSUE)
            .bind(issue.id.inner())
            .bind(watcher.user_id.inner())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, issue_id: &ID) -> anyhow::Result<Option<Issue>> {
        let issue = sqlx::query_as::<_, IssueRaw>(
            r#"
            SELECT i.id, i.subject, i.due_date, i.assigned_to_id, i.author_id,
                s.id AS status_id, s.name AS status_name, s.is_closed AS status_is_closed
            FROM issues AS i
            INNER JOIN issue_statuses AS s ON s.id = i.status_id
            WHERE i.id = $1
            "#,
        )
        .bind(issue_id.inner())
        .fetch_optional(&self.pool)
        .await?;

        let issue = match issue {
            Some(issue) => issue,
            None => return Ok(None),
        };

        let watchers = sqlx::query_as::<_, WatcherRaw>(
            r#"
            SELECT w.user_id FROM watchers AS w
            WHERE w.watchable_type = $1 AND w.watchable_id = $2
            ORDER BY w.id
            "#,
        )
        .bind(WATCHABLE_TYPE_ISSUE)
        .bind(issue_id.inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(issue.into_issue(watchers)))
    }
}

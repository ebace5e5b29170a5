use super::IRappelRepo;
use chrono::{DateTime, Utc};
use rappel_scheduler_domain::{Rappel, RappelFrequency, ID};
use sqlx::{FromRow, PgPool};
use tracing::warn;

pub struct PostgresRappelRepo {
    pool: PgPool,
}

impl PostgresRappelRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RappelRaw {
    id: i64,
    issue_id: i64,
    subject: Option<String>,
    frequency: String,
    interval_count: i32,
    next_run_date: Option<DateTime<Utc>>,
    last_sent_at: Option<DateTime<Utc>>,
}

impl From<RappelRaw> for Rappel {
    fn from(raw: RappelRaw) -> Self {
        let frequency = raw.frequency.parse::<RappelFrequency>().unwrap_or_else(|e| {
            warn!("Rappel {}: {}, falling back to the default", raw.id, e);
            Default::default()
        });
        Rappel {
            id: raw.id.into(),
            issue_id: raw.issue_id.into(),
            subject: raw.subject,
            frequency,
            interval: raw.interval_count.max(1) as u32,
            next_run_date: raw.next_run_date,
            last_sent_at: raw.last_sent_at,
        }
    }
}

#[async_trait::async_trait]
impl IRappelRepo for PostgresRappelRepo {
    async fn insert(&self, rappel: &Rappel) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rappels
            (id, issue_id, subject, frequency, interval_count, next_run_date, last_sent_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(rappel.id.inner())
        .bind(rappel.issue_id.inner())
        .bind(&rappel.subject)
        .bind(rappel.frequency.to_string())
        .bind(rappel.interval as i32)
        .bind(rappel.next_run_date)
        .bind(rappel.last_sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, rappel: &Rappel) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE rappels
            SET issue_id = $2,
            subject = $3,
            frequency = $4,
            interval_count = $5,
            next_run_date = $6,
            last_sent_at = $7,
            updated_on = now()
            WHERE id = $1
            "#,
        )
        .bind(rappel.id.inner())
        .bind(rappel.issue_id.inner())
        .bind(&rappel.subject)
        .bind(rappel.frequency.to_string())
        .bind(rappel.interval as i32)
        .bind(rappel.next_run_date)
        .bind(rappel.last_sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, rappel_id: &ID) -> Option<Rappel> {
        sqlx::query_as::<_, RappelRaw>(
            r#"
            SELECT id, issue_id, subject, frequency, interval_count, next_run_date, last_sent_at
            FROM rappels
            WHERE id = $1
            "#,
        )
        .bind(rappel_id.inner())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|rappel| rappel.into())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Rappel>> {
        let rappels = sqlx::query_as::<_, RappelRaw>(
            r#"
            SELECT id, issue_id, subject, frequency, interval_count, next_run_date, last_sent_at
            FROM rappels
            WHERE next_run_date <= $1 OR next_run_date IS NULL
            ORDER BY id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rappels.into_iter().map(|rappel| rappel.into()).collect())
    }
}

use super::{IJobLockRepo, ISettingsRepo};
use rappel_scheduler_domain::{
    PluginSettings, JOB_LOCKED_KEY, LOCK_TIMESTAMP_KEY, PLUGIN_SETTINGS_NAME,
};
use sqlx::{FromRow, PgPool};
use tracing::warn;

/// The settings record is stored as a JSON object of string values in the
/// `value` column of the `settings` table.
pub struct PostgresSettingsRepo {
    pool: PgPool,
}

impl PostgresSettingsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_record(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings(name, value, updated_on)
            VALUES($1, '{}', now())
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(PLUGIN_SETTINGS_NAME)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct SettingRaw {
    value: Option<String>,
}

fn parse_values(raw: &str) -> anyhow::Result<Vec<(String, String)>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let values: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

#[async_trait::async_trait]
impl ISettingsRepo for PostgresSettingsRepo {
    async fn get(&self) -> anyhow::Result<PluginSettings> {
        let setting = sqlx::query_as::<_, SettingRaw>(
            r#"
            SELECT value FROM settings
            WHERE name = $1
            "#,
        )
        .bind(PLUGIN_SETTINGS_NAME)
        .fetch_optional(&self.pool)
        .await?;

        match setting {
            Some(SettingRaw { value: Some(value) }) => Ok(PluginSettings::from_map(parse_values(&value)?)),
            _ => Ok(PluginSettings::default()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings(name, value, updated_on)
            VALUES($1, jsonb_build_object($2::text, $3::text)::text, now())
            ON CONFLICT (name) DO UPDATE
            SET value = (COALESCE(NULLIF(settings.value, ''), '{}')::jsonb || jsonb_build_object($2::text, $3::text))::text,
            updated_on = now()
            "#,
        )
        .bind(PLUGIN_SETTINGS_NAME)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Record value holding a freshly acquired lock, `None` when the lock stored
/// in `stored` is live. Unreadable records count as holding no lock.
fn locked_record(stored: Option<&str>, now_secs: i64, stale_window_secs: i64) -> Option<String> {
    let mut values = match parse_values(stored.unwrap_or_default()) {
        Ok(values) => values,
        Err(e) => {
            warn!("Unreadable rappel settings record, resetting it: {:?}", e);
            Vec::new()
        }
    };
    let mut job_lock = PluginSettings::from_map(values.clone()).job_lock;
    if !job_lock.try_acquire(now_secs, stale_window_secs) {
        return None;
    }

    values.retain(|(key, _)| key != JOB_LOCKED_KEY && key != LOCK_TIMESTAMP_KEY);
    values.push((JOB_LOCKED_KEY.into(), job_lock.locked.to_string()));
    values.push((LOCK_TIMESTAMP_KEY.into(), job_lock.lock_timestamp.to_string()));
    let record: serde_json::Map<String, serde_json::Value> = values
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect();
    Some(serde_json::Value::Object(record).to_string())
}

#[async_trait::async_trait]
impl IJobLockRepo for PostgresSettingsRepo {
    async fn try_acquire(&self, now_secs: i64, stale_window_secs: i64) -> anyhow::Result<bool> {
        self.ensure_record().await?;

        let stored = sqlx::query_as::<_, SettingRaw>(
            r#"
            SELECT value FROM settings
            WHERE name = $1
            "#,
        )
        .bind(PLUGIN_SETTINGS_NAME)
        .fetch_one(&self.pool)
        .await?
        .value;

        let record = match locked_record(stored.as_deref(), now_secs, stale_window_secs) {
            Some(record) => record,
            None => return Ok(false),
        };

        // Compare and swap: a process that changed the record since it was
        // read has taken the lock first.
        let acquired = sqlx::query(
            r#"
            UPDATE settings
            SET value = $2, updated_on = now()
            WHERE name = $1 AND value IS NOT DISTINCT FROM $3
            RETURNING id
            "#,
        )
        .bind(PLUGIN_SETTINGS_NAME)
        .bind(record)
        .bind(stored)
        .fetch_optional(&self.pool)
        .await?;

        Ok(acquired.is_some())
    }

    async fn release(&self) -> anyhow::Result<()> {
        self.set(JOB_LOCKED_KEY, "false").await
    }
}

#[cfg(test)]
mod tests {
    use super::{locked_record, parse_values};
    use rappel_scheduler_domain::PluginSettings;

    const NOW: i64 = 1_613_862_000;
    const STALE: i64 = 600;

    fn lock_of(record: &str) -> (bool, i64, PluginSettings) {
        let settings = PluginSettings::from_map(parse_values(record).unwrap());
        (settings.job_lock.locked, settings.job_lock.lock_timestamp, settings)
    }

    #[test]
    fn live_lock_is_not_taken() {
        let stored = r#"{"job_locked":"true","lock_timestamp":"1613861970"}"#;
        assert!(locked_record(Some(stored), NOW, STALE).is_none());
    }

    #[test]
    fn free_or_stale_lock_is_taken_keeping_other_values() {
        for stored in [
            None,
            Some(""),
            Some(r#"{"overdue_only":"1","job_locked":"false"}"#),
            Some(r#"{"overdue_only":"1","job_locked":"true","lock_timestamp":"1613861300"}"#),
        ] {
            let record = locked_record(stored, NOW, STALE).unwrap();
            let (locked, lock_timestamp, settings) = lock_of(&record);
            assert!(locked);
            assert_eq!(lock_timestamp, NOW);
            assert_eq!(settings.overdue_only, stored.is_some_and(|s| s.contains("overdue_only")));
        }
    }

    #[test]
    fn unreadable_records_are_reclaimable() {
        for stored in [
            r#"{"job_locked":"true","lock_timestamp":"soon"}"#,
            r#"{"job_locked":"true","lock_timestamp":"-9223372036854775808"}"#,
            r#"{"job_locked":"true","lock_timestamp":1.5}"#,
            "not json",
        ] {
            let record = locked_record(Some(stored), NOW, STALE).unwrap();
            let (locked, lock_timestamp, _) = lock_of(&record);
            assert!(locked);
            assert_eq!(lock_timestamp, NOW);
        }
    }

    #[test]
    fn parses_stored_values() {
        let mut values =
            parse_values(r#"{"job_locked":"true","lock_timestamp":1613862000,"x":null}"#).unwrap();
        values.sort();
        assert_eq!(
            values,
            vec![
                ("job_locked".to_string(), "true".to_string()),
                ("lock_timestamp".to_string(), "1613862000".to_string()),
                ("x".to_string(), "".to_string()),
            ]
        );
        assert!(parse_values("").unwrap().is_empty());
        assert!(parse_values("not json").is_err());
    }
}

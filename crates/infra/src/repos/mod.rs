mod issue;
mod rappel;
mod settings;
mod shared;
mod user;

pub use issue::IIssueRepo;
use issue::{InMemoryIssueRepo, PostgresIssueRepo};
pub use rappel::IRappelRepo;
use rappel::{InMemoryRappelRepo, PostgresRappelRepo};
pub use settings::{IJobLockRepo, ISettingsRepo};
use settings::{InMemorySettingsRepo, PostgresSettingsRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub rappels: Arc<dyn IRappelRepo>,
    pub issues: Arc<dyn IIssueRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub settings: Arc<dyn ISettingsRepo>,
    /// Backed by the same record as `settings`
    pub job_lock: Arc<dyn IJobLockRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        let settings = Arc::new(PostgresSettingsRepo::new(pool.clone()));
        Ok(Self {
            rappels: Arc::new(PostgresRappelRepo::new(pool.clone())),
            issues: Arc::new(PostgresIssueRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool)),
            settings: settings.clone(),
            job_lock: settings,
        })
    }

    pub fn create_inmemory() -> Self {
        let settings = Arc::new(InMemorySettingsRepo::new());
        Self {
            rappels: Arc::new(InMemoryRappelRepo::new()),
            issues: Arc::new(InMemoryIssueRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            settings: settings.clone(),
            job_lock: settings,
        }
    }
}

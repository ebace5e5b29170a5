mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{IIssueRepo, IJobLockRepo, IRappelRepo, ISettingsRepo, IUserRepo, Repos};
pub use services::*;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::warn;

#[derive(Clone)]
pub struct RappelContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub mailer: Arc<dyn IMailer>,
}

impl RappelContext {
    async fn create(config: Config) -> anyhow::Result<Self> {
        let repos = match &config.database_url {
            Some(url) => Repos::create_postgres(url).await?,
            None => {
                warn!("Running with in-memory repositories, nothing will be persisted.");
                Repos::create_inmemory()
            }
        };
        let mailer = Arc::new(SmtpMailer::new(&config)?);
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            mailer,
        })
    }

    /// In-memory repositories and mailer, for tests
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            mailer: Arc::new(InMemoryMailer::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<RappelContext> {
    RappelContext::create(Config::new()).await
}

/// Runs the pending migrations against the database given by `DATABASE_URL`
pub async fn run_migration(database_url: &str) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}

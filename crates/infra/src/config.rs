use std::fmt::Display;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Postgres connection string. In-memory repositories are used when
    /// this is not set.
    pub database_url: Option<String>,
    /// Host name of the issue tracker, used to build issue links in emails
    pub host_name: String,
    /// Protocol of the issue tracker, `http` or `https`
    pub protocol: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address of the rappel emails
    pub mail_from: String,
    /// Seconds between two runs of the rappel job
    pub job_interval_secs: u64,
    /// Seconds between startup and the first run of the rappel job
    pub job_start_delay_secs: u64,
    /// Age in seconds after which a held job lock is considered abandoned
    pub lock_stale_secs: i64,
}

impl Config {
    pub fn new() -> Self {
        Self::from_env(|key| std::env::var(key).ok())
    }

    fn from_env<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if database_url.is_none() {
            info!("Did not find DATABASE_URL environment variable. Going to use in-memory storage.");
        }

        let smtp_username = var("SMTP_USERNAME").filter(|u| !u.is_empty());
        let smtp_password = var("SMTP_PASSWORD").filter(|p| !p.is_empty());
        if smtp_username.is_some() != smtp_password.is_some() {
            warn!("Only one of SMTP_USERNAME and SMTP_PASSWORD was given, SMTP authentication is disabled.");
        }

        Self {
            port: parse_var(&var, "PORT", 5000),
            database_url,
            host_name: var("HOST_NAME").unwrap_or_else(|| "localhost:5000".into()),
            protocol: var("PROTOCOL").unwrap_or_else(|| "http".into()),
            smtp_host: var("SMTP_HOST").unwrap_or_else(|| "localhost".into()),
            smtp_port: parse_var(&var, "SMTP_PORT", 25),
            smtp_username,
            smtp_password,
            mail_from: var("MAIL_FROM").unwrap_or_else(|| "redmine@localhost".into()),
            job_interval_secs: parse_var(&var, "RAPPEL_JOB_INTERVAL_SECS", 60),
            job_start_delay_secs: parse_var(&var, "RAPPEL_JOB_START_DELAY_SECS", 60),
            lock_stale_secs: parse_var(&var, "RAPPEL_LOCK_STALE_SECS", 600),
        }
    }

    /// Credentials for the SMTP server, only when both parts are set
    pub fn smtp_credentials(&self) -> Option<(String, String)> {
        match (&self.smtp_username, &self.smtp_password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        }
    }
}

fn parse_var<F, T>(var: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
{
    let value = match var(key) {
        Some(value) => value,
        None => return default,
    };
    match value.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default: {}.",
                key, value, default
            );
            default
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

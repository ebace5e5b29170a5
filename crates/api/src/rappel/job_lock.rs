use futures::FutureExt;
use rappel_scheduler_infra::RappelContext;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug, PartialEq)]
pub enum JobLockError {
    #[error("The rappel job lock is held by another process")]
    Busy,
    #[error("The rappel job lock could not be read: {0}")]
    Unavailable(String),
    #[error("The rappel job panicked: {0}")]
    Panicked(String),
}

/// Runs `job` while holding the rappel job lock.
///
/// The lock is released once `job` is done, also when it panics. Nothing
/// runs when the lock is held by someone else or cannot be read.
pub async fn with_job_lock<F, T>(ctx: &RappelContext, job: F) -> Result<T, JobLockError>
where
    F: Future<Output = T>,
{
    let now = ctx.sys.get_timestamp_secs();
    match ctx
        .repos
        .job_lock
        .try_acquire(now, ctx.config.lock_stale_secs)
        .await
    {
        Ok(true) => info!("Rappel job lock acquired at {}", now),
        Ok(false) => {
            info!("Rappel job lock is held by another process, skipping this run");
            return Err(JobLockError::Busy);
        }
        Err(e) => {
            error!("Unable to acquire the rappel job lock: {:?}", e);
            return Err(JobLockError::Unavailable(e.to_string()));
        }
    }

    let res = AssertUnwindSafe(job).catch_unwind().await;
    release_job_lock(ctx).await;

    res.map_err(|panic| JobLockError::Panicked(panic_message(panic.as_ref())))
}

/// A failed release leaves the lock to expire through the staleness window
async fn release_job_lock(ctx: &RappelContext) {
    match ctx.repos.job_lock.release().await {
        Ok(()) => info!("Rappel job lock released"),
        Err(e) => warn!(
            "Unable to release the rappel job lock, it will be reclaimed after {} seconds: {:?}",
            ctx.config.lock_stale_secs, e
        ),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".into()
    }
}

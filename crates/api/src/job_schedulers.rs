use crate::{
    rappel::{
        job_lock::{panic_message, with_job_lock, JobLockError},
        process_due_rappels::ProcessDueRappelsUseCase,
    },
    shared::usecase::execute,
};
use actix_web::rt::time::sleep;
use futures::FutureExt;
use rappel_scheduler_domain::{CycleOutcome, SERVER_INSTANCE_ID_KEY};
use rappel_scheduler_infra::RappelContext;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Runs the rappel job once: takes the job lock, sends the due rappels and
/// releases the lock.
pub async fn run_process_rappels_cycle(ctx: &RappelContext) -> CycleOutcome {
    info!("Rappel job run started");
    let cycle = execute(ProcessDueRappelsUseCase {}, ctx);
    match with_job_lock(ctx, cycle).await {
        Ok(Ok(report)) => CycleOutcome::Completed(report),
        Ok(Err(e)) => CycleOutcome::Failed(e.to_string()),
        Err(JobLockError::Busy) => CycleOutcome::LockBusy,
        Err(e) => CycleOutcome::Failed(e.to_string()),
    }
}

/// Same as `run_process_rappels_cycle`, with a panic anywhere in the run
/// (lock handling included) reported as a failed run.
async fn run_guarded_cycle(ctx: &RappelContext) -> CycleOutcome {
    match AssertUnwindSafe(run_process_rappels_cycle(ctx))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(panic) => CycleOutcome::Failed(
            JobLockError::Panicked(panic_message(panic.as_ref())).to_string(),
        ),
    }
}

/// Outcomes of the rappel job runs in this process
#[derive(Debug, Clone, Default)]
pub struct JobMonitor {
    inner: Arc<Mutex<JobMonitorState>>,
}

#[derive(Debug, Default)]
struct JobMonitorState {
    cycles_run: u64,
    last_outcome: Option<CycleOutcome>,
}

impl JobMonitor {
    pub fn record(&self, outcome: CycleOutcome) {
        if let Ok(mut state) = self.inner.lock() {
            state.cycles_run += 1;
            state.last_outcome = Some(outcome);
        }
    }

    pub fn cycles_run(&self) -> u64 {
        self.inner.lock().map(|state| state.cycles_run).unwrap_or(0)
    }

    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.last_outcome.clone())
    }
}

/// Stops the rappel job loop when dropped or stopped
pub struct RappelJobHandle {
    shutdown: watch::Sender<bool>,
}

impl RappelJobHandle {
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for RappelJobHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs the rappel job after `start_delay` and then again
/// `job_interval_secs` after the end of every run, whatever its outcome.
pub fn start_rappel_job(
    ctx: RappelContext,
    monitor: JobMonitor,
    start_delay: Duration,
) -> RappelJobHandle {
    let (shutdown, mut stopped) = watch::channel(false);
    let interval = Duration::from_secs(ctx.config.job_interval_secs);

    actix_web::rt::spawn(async move {
        let mut delay = start_delay;
        loop {
            tokio::select! {
                _ = sleep(delay) => {}
                _ = stopped.changed() => {
                    info!("Rappel job stopped");
                    break;
                }
            }

            let outcome = run_guarded_cycle(&ctx).await;
            match &outcome {
                CycleOutcome::Completed(_) => info!("Rappel job run completed"),
                CycleOutcome::LockBusy => info!("Rappel job run skipped, lock is busy"),
                CycleOutcome::Failed(e) => error!("Rappel job run failed: {}", e),
            }
            monitor.record(outcome);

            delay = interval;
            info!("Next rappel job run in {} seconds", delay.as_secs());
        }
    });

    RappelJobHandle { shutdown }
}

/// Identifies this process among the ones sharing the settings store
pub fn server_instance_id() -> &'static str {
    static SERVER_INSTANCE_ID: OnceLock<String> = OnceLock::new();
    SERVER_INSTANCE_ID.get_or_init(|| {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("{}{}", std::process::id(), started_at)
    })
}

/// Schedules the first run of the rappel job, unless this server instance
/// already did so. Returns `None` when nothing was scheduled.
pub async fn bootstrap_rappel_job(
    ctx: RappelContext,
    monitor: JobMonitor,
) -> Option<RappelJobHandle> {
    let instance_id = server_instance_id();
    match ctx.repos.settings.get().await {
        Ok(settings) if settings.server_instance_id.as_deref() == Some(instance_id) => {
            info!(
                "Rappel job already scheduled by server instance {}",
                instance_id
            );
            return None;
        }
        Ok(_) => (),
        Err(e) => warn!(
            "Unable to read the rappel settings, scheduling the rappel job anyway: {:?}",
            e
        ),
    }

    if let Err(e) = ctx
        .repos
        .settings
        .set(SERVER_INSTANCE_ID_KEY, instance_id)
        .await
    {
        warn!("Unable to store the server instance id: {:?}", e);
    }

    let start_delay = Duration::from_secs(ctx.config.job_start_delay_secs);
    info!(
        "Rappel job scheduled by server instance {}, first run in {} seconds",
        instance_id,
        start_delay.as_secs()
    );
    Some(start_rappel_job(ctx, monitor, start_delay))
}

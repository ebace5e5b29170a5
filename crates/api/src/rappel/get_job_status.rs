use crate::{
    error::RappelSchedulerError,
    job_schedulers::JobMonitor,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use rappel_scheduler_api_structs::dtos::{CycleOutcomeDTO, JobLockDTO};
use rappel_scheduler_api_structs::get_rappel_job_status::APIResponse;
use rappel_scheduler_domain::{CycleOutcome, PluginSettings};
use rappel_scheduler_infra::RappelContext;

pub async fn get_rappel_job_status_controller(
    ctx: web::Data<RappelContext>,
    monitor: web::Data<JobMonitor>,
) -> Result<HttpResponse, RappelSchedulerError> {
    let usecase = GetRappelJobStatusUseCase {
        monitor: monitor.get_ref().clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                job_lock: JobLockDTO::new(
                    res.settings.job_lock,
                    res.now_secs,
                    ctx.config.lock_stale_secs,
                ),
                overdue_only: res.settings.overdue_only,
                server_instance_id: res.settings.server_instance_id,
                cycles_run: res.cycles_run,
                last_cycle: res.last_outcome.as_ref().map(CycleOutcomeDTO::new),
            })
        })
        .map_err(|e| match e {
            UseCaseErrors::StorageError => RappelSchedulerError::InternalError,
        })
}

#[derive(Debug)]
struct GetRappelJobStatusUseCase {
    monitor: JobMonitor,
}

#[derive(Debug)]
struct UseCaseRes {
    settings: PluginSettings,
    now_secs: i64,
    cycles_run: u64,
    last_outcome: Option<CycleOutcome>,
}

#[derive(Debug)]
enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetRappelJobStatusUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RappelContext) -> Result<Self::Response, Self::Errors> {
        let settings = ctx
            .repos
            .settings
            .get()
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        Ok(UseCaseRes {
            settings,
            now_secs: ctx.sys.get_timestamp_secs(),
            cycles_run: self.monitor.cycles_run(),
            last_outcome: self.monitor.last_outcome(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::*;
    use rappel_scheduler_domain::CycleReport;

    #[actix_web::test]
    async fn reports_lock_and_last_run() {
        let ctx = setup().ctx;
        let monitor = JobMonitor::default();
        monitor.record(CycleOutcome::LockBusy);
        monitor.record(CycleOutcome::Completed(CycleReport::new(now())));
        ctx.repos
            .job_lock
            .try_acquire(now().timestamp() - 700, 600)
            .await
            .unwrap();

        let mut usecase = GetRappelJobStatusUseCase { monitor };
        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.settings.job_lock.locked);
        assert!(res
            .settings
            .job_lock
            .is_stale(res.now_secs, ctx.config.lock_stale_secs));
        assert_eq!(res.cycles_run, 2);
        assert_eq!(
            res.last_outcome,
            Some(CycleOutcome::Completed(CycleReport::new(now())))
        );
    }
}

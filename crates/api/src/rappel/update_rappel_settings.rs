use crate::{
    error::RappelSchedulerError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use rappel_scheduler_api_structs::update_rappel_settings::{APIResponse, RequestBody};
use rappel_scheduler_domain::OVERDUE_ONLY_KEY;
use rappel_scheduler_infra::RappelContext;

pub async fn update_rappel_settings_controller(
    ctx: web::Data<RappelContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, RappelSchedulerError> {
    let usecase = UpdateRappelSettingsUseCase {
        overdue_only: body.overdue_only,
    };

    execute(usecase, &ctx)
        .await
        .map(|overdue_only| HttpResponse::Ok().json(APIResponse { overdue_only }))
        .map_err(|e| match e {
            UseCaseErrors::StorageError => RappelSchedulerError::InternalError,
        })
}

/// Only touches `overdue_only`, the job lock fields are left as they are
#[derive(Debug)]
struct UpdateRappelSettingsUseCase {
    overdue_only: bool,
}

#[derive(Debug)]
enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateRappelSettingsUseCase {
    type Response = bool;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RappelContext) -> Result<Self::Response, Self::Errors> {
        let value = if self.overdue_only { "1" } else { "0" };
        ctx.repos
            .settings
            .set(OVERDUE_ONLY_KEY, value)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        let settings = ctx
            .repos
            .settings
            .get()
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        Ok(settings.overdue_only)
    }
}

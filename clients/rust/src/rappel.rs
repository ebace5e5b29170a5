use crate::{APIResponse, BaseClient};
use rappel_scheduler_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct RappelClient {
    base: Arc<BaseClient>,
}

pub type UpdateRappelSettingsInput = update_rappel_settings::RequestBody;

impl RappelClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Job lock, settings and last run of the rappel job
    pub async fn job_status(&self) -> APIResponse<get_rappel_job_status::APIResponse> {
        self.base.get("rappels/job".into(), StatusCode::OK).await
    }

    pub async fn update_settings(
        &self,
        input: UpdateRappelSettingsInput,
    ) -> APIResponse<update_rappel_settings::APIResponse> {
        self.base
            .put(input, "rappels/settings".into(), StatusCode::OK)
            .await
    }
}

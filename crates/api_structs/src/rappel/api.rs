use crate::dtos::{CycleOutcomeDTO, JobLockDTO, RappelSettingsDTO};
use serde::{Deserialize, Serialize};

pub mod get_rappel_job_status {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub job_lock: JobLockDTO,
        pub overdue_only: bool,
        #[serde(default)]
        pub server_instance_id: Option<String>,
        /// Runs of the rappel job in the answering process
        pub cycles_run: u64,
        #[serde(default)]
        pub last_cycle: Option<CycleOutcomeDTO>,
    }
}

pub mod update_rappel_settings {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub overdue_only: bool,
    }

    pub type APIResponse = RappelSettingsDTO;
}

mod base;
mod rappel;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use rappel::RappelClient;
pub use rappel::UpdateRappelSettingsInput;
pub use rappel_scheduler_api_structs::dtos::*;
use status::StatusClient;
use std::sync::Arc;

/// Rappel Scheduler Server SDK
///
/// The SDK contains methods for interacting with the Rappel Scheduler server
/// API.
#[derive(Clone)]
pub struct RappelSDK {
    pub rappel: RappelClient,
    pub status: StatusClient,
}

impl RappelSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let rappel = RappelClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { rappel, status }
    }
}

pub mod dispatch_rappel;
mod get_job_status;
pub mod job_lock;
pub mod process_due_rappels;
pub mod rappel_email;
pub mod resolve_recipients;
pub mod select_due_rappels;
mod update_rappel_settings;

use actix_web::web;
use get_job_status::get_rappel_job_status_controller;
use thiserror::Error;
use update_rappel_settings::update_rappel_settings_controller;

/// Failure while processing one due `Rappel`. Does not affect the other
/// `Rappel`s of the run.
#[derive(Error, Debug)]
pub enum RappelError {
    #[error("Unable to look up the issue: {0}")]
    IssueLookup(anyhow::Error),
    #[error("Unable to look up the recipients: {0}")]
    RecipientLookup(anyhow::Error),
    #[error("Unable to mark the rappel as sent: {0}")]
    MarkAsSent(anyhow::Error),
}

/// Failure to notify one recipient of a `Rappel`
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Unable to render the rappel email for {recipient}: {reason}")]
    Render { recipient: String, reason: String },
    #[error("Unable to send the rappel email to {recipient}: {reason}")]
    Transport { recipient: String, reason: String },
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/rappels/job",
        web::get().to(get_rappel_job_status_controller),
    );
    cfg.route(
        "/rappels/settings",
        web::put().to(update_rappel_settings_controller),
    );
}

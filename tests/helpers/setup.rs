use rappel_scheduler_api::Application;
use rappel_scheduler_infra::{InMemoryMailer, RappelContext};
use rappel_scheduler_sdk::RappelSDK;
use std::sync::Arc;

pub struct TestApp {
    pub ctx: RappelContext,
    pub mailer: Arc<InMemoryMailer>,
}

// Launch the application as a background task, with the first run of the
// rappel job after `job_start_delay_secs`
pub async fn spawn_app(job_start_delay_secs: u64) -> (TestApp, RappelSDK, String) {
    let mailer = Arc::new(InMemoryMailer::new());
    let mut ctx = RappelContext::create_inmemory();
    ctx.mailer = mailer.clone();
    ctx.config.port = 0; // Random port
    ctx.config.job_start_delay_secs = job_start_delay_secs;

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { ctx, mailer };
    let sdk = RappelSDK::new(address.clone());
    (app, sdk, address)
}

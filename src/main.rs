mod telemetry;

use rappel_scheduler_api::Application;
use rappel_scheduler_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("rappel_scheduler_server".into(), "info".into());
    init_subscriber(subscriber)?;

    let context = setup_context().await?;
    if let Some(database_url) = &context.config.database_url {
        run_migration(database_url).await?;
    }

    let app = Application::new(context).await?;
    app.start().await?;
    Ok(())
}

mod error;
mod job_schedulers;
mod rappel;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::{bootstrap_rappel_job, JobMonitor, RappelJobHandle};
use rappel_scheduler_infra::RappelContext;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub use job_schedulers::server_instance_id;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    rappel::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    rappel_job: Option<RappelJobHandle>,
}

impl Application {
    pub async fn new(context: RappelContext) -> Result<Self, std::io::Error> {
        let monitor = JobMonitor::default();
        let (server, port) =
            Application::configure_server(context.clone(), monitor.clone()).await?;
        let rappel_job = bootstrap_rappel_job(context, monitor).await;

        Ok(Self {
            server,
            port,
            rappel_job,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(
        context: RappelContext,
        monitor: JobMonitor,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(context.clone()))
                .app_data(web::Data::new(monitor.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the server is stopped, the rappel job stops with it
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        if let Some(rappel_job) = &self.rappel_job {
            rappel_job.stop();
        }
        res
    }
}

mod event;
mod job_schedulers;
mod notification;
mod shared;
mod status;

pub use event::create_event::CreateEventUseCase;
pub use event::delete_event::DeleteEventUseCase;
pub use event::invite_member::InviteMemberUseCase;
pub use event::update_event::UpdateEventUseCase;
pub use notification::reminder_queue::{ReminderKey, ReminderQueue};
pub use notification::send_notification::SendNotificationUseCase;
pub use notification::sync_reminders::SyncUpcomingRemindersUseCase;
pub use shared::usecase::{execute, Subscriber, UseCase};

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use chronos_infra::ChronosContext;
use job_schedulers::{start_invite_notifications_job, start_reminder_sync_job};
use std::net::TcpListener;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    reminders: Arc<ReminderQueue>,
    jobs: Vec<JoinHandle<()>>,
}

impl Application {
    pub async fn new(context: ChronosContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;

        let reminders = ReminderQueue::new(context.clone());
        let jobs = Application::start_job_schedulers(context, reminders.clone());

        Ok(Self {
            server,
            port,
            reminders,
            jobs,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The reminder queue handle. Event/calendar services schedule and
    /// cancel through this.
    pub fn reminders(&self) -> Arc<ReminderQueue> {
        self.reminders.clone()
    }

    fn start_job_schedulers(
        context: ChronosContext,
        reminders: Arc<ReminderQueue>,
    ) -> Vec<JoinHandle<()>> {
        vec![
            start_reminder_sync_job(context.clone(), reminders),
            start_invite_notifications_job(context),
        ]
    }

    async fn configure_server(context: ChronosContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr().unwrap().port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger)
                .data(ctx)
                .service(web::scope("/api/v1").configure(|cfg| configure_server_api(cfg)))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;

        // Release the periodic jobs and every armed reminder timer on the
        // way out.
        for job in &self.jobs {
            job.abort();
        }
        self.reminders.shutdown();

        res
    }
}

use crate::notification::invite_subscriber::handle_domain_event;
use crate::notification::reminder_queue::ReminderQueue;
use crate::notification::sync_reminders::SyncUpcomingRemindersUseCase;
use crate::shared::usecase::execute;
use actix_web::rt;
use actix_web::rt::time::interval;
use chronos_infra::ChronosContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::warn;

/// Periodically reconciles the reminder queue against the event store.
/// The first tick completes immediately, which doubles as the startup
/// pass. A failed pass is logged by `execute` and retried on the next
/// tick.
pub fn start_reminder_sync_job(
    ctx: ChronosContext,
    reminders: Arc<ReminderQueue>,
) -> JoinHandle<()> {
    rt::spawn(async move {
        let period = Duration::from_millis(ctx.config.reminder_sync_interval_millis as u64);
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            let usecase = SyncUpcomingRemindersUseCase {
                reminders: reminders.clone(),
            };
            let _ = execute(usecase, &ctx).await;
        }
    })
}

/// Consumes invite events from the domain bus for the lifetime of the
/// process.
pub fn start_invite_notifications_job(ctx: ChronosContext) -> JoinHandle<()> {
    rt::spawn(async move {
        let mut events = ctx.bus.subscribe();
        loop {
            match events.recv().await {
                Ok(event) => handle_domain_event(event, &ctx).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Invite notification consumer lagged, skipped {} events",
                        skipped
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

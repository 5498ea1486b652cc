use crate::notification::reminder_queue::ReminderQueue;
use crate::shared::usecase::UseCase;
use chronos_infra::ChronosContext;
use std::sync::Arc;
use tracing::debug;

/// Reconciles the reminder queue against the event store: every future
/// event with reminders whose notify time falls inside the scheduling
/// window gets offered to the queue again. The queue's own deduplication
/// makes the pass safe to repeat.
#[derive(Debug)]
pub struct SyncUpcomingRemindersUseCase {
    pub reminders: Arc<ReminderQueue>,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncUpcomingRemindersUseCase {
    /// Number of schedule offers made to the queue this pass
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncUpcomingReminders";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let window_end = now + ctx.config.reminder_schedule_window_millis;

        let events = ctx
            .repos
            .events
            .find_upcoming_with_reminders(now)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut scheduled = 0;
        for event in events {
            for reminder in &event.reminders {
                let notify_at = event.start_ts - reminder.minutes_before * 60 * 1000;
                if notify_at <= now || notify_at > window_end {
                    continue;
                }
                for recipient in event.reminder_recipients() {
                    self.reminders.schedule_reminder(
                        &event.id,
                        &recipient,
                        &event.title,
                        event.start_ts,
                        reminder.method,
                        reminder.minutes_before,
                    );
                    scheduled += 1;
                }
            }
        }

        debug!("Offered {} reminders from the event store", scheduled);
        Ok(scheduled)
    }
}

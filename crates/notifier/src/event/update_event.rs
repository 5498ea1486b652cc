use super::subscribers::SyncRemindersOnEventUpdated;
use crate::notification::reminder_queue::ReminderQueue;
use crate::shared::usecase::{Subscriber, UseCase};
use chronos_domain::{CalendarEvent, EventReminder, ID};
use chronos_infra::ChronosContext;
use std::sync::Arc;

#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub event_id: ID,
    pub title: Option<String>,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub reminders: Option<Vec<EventReminder>>,
    pub reminder_queue: Arc<ReminderQueue>,
}

#[derive(Debug)]
pub struct UpdatedEvent {
    pub event: CalendarEvent,
    /// True when reminders, start or end changed, i.e. the reminder
    /// schedule has to be rebuilt.
    pub schedule_changed: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidTimespan,
    InvalidReminder,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = UpdatedEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        let mut event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.event_id.clone()))?;

        let schedule_changed =
            self.start_ts.is_some() || self.end_ts.is_some() || self.reminders.is_some();

        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(start_ts) = self.start_ts {
            event.start_ts = start_ts;
        }
        if let Some(end_ts) = self.end_ts {
            event.end_ts = end_ts;
        }
        if let Some(reminders) = &self.reminders {
            for reminder in reminders {
                if !reminder.is_valid() {
                    return Err(UseCaseError::InvalidReminder);
                }
            }
            event.reminders = reminders.clone();
        }
        if event.end_ts < event.start_ts {
            return Err(UseCaseError::InvalidTimespan);
        }
        event.updated = ctx.sys.get_timestamp_millis();

        ctx.repos
            .events
            .save(&event)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UpdatedEvent {
            event,
            schedule_changed,
        })
    }

    fn subscribers(&self) -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SyncRemindersOnEventUpdated {
            reminders: self.reminder_queue.clone(),
        })]
    }
}

use super::create_event::CreateEventUseCase;
use super::delete_event::DeleteEventUseCase;
use super::update_event::{UpdateEventUseCase, UpdatedEvent};
use crate::notification::reminder_queue::ReminderQueue;
use crate::shared::usecase::Subscriber;
use chronos_domain::CalendarEvent;
use chronos_infra::ChronosContext;
use std::sync::Arc;

pub struct CreateRemindersOnEventCreated {
    pub reminders: Arc<ReminderQueue>,
}

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateEventUseCase> for CreateRemindersOnEventCreated {
    async fn notify(&self, e: &CalendarEvent, _ctx: &ChronosContext) {
        if !e.reminders.is_empty() {
            self.reminders.schedule_event_reminders(e);
        }
    }
}

pub struct SyncRemindersOnEventUpdated {
    pub reminders: Arc<ReminderQueue>,
}

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateEventUseCase> for SyncRemindersOnEventUpdated {
    async fn notify(&self, e: &UpdatedEvent, _ctx: &ChronosContext) {
        if !e.schedule_changed {
            return;
        }
        self.reminders.cancel_event_reminders(&e.event.id);
        if !e.event.reminders.is_empty() {
            self.reminders.schedule_event_reminders(&e.event);
        }
    }
}

pub struct CancelRemindersOnEventDeleted {
    pub reminders: Arc<ReminderQueue>,
}

#[async_trait::async_trait(?Send)]
impl Subscriber<DeleteEventUseCase> for CancelRemindersOnEventDeleted {
    async fn notify(&self, e: &CalendarEvent, _ctx: &ChronosContext) {
        self.reminders.cancel_event_reminders(&e.id);
    }
}

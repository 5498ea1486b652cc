use super::subscribers::CancelRemindersOnEventDeleted;
use crate::notification::reminder_queue::ReminderQueue;
use crate::shared::usecase::{Subscriber, UseCase};
use chronos_domain::{CalendarEvent, ID};
use chronos_infra::ChronosContext;
use std::sync::Arc;

#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub event_id: ID,
    pub reminder_queue: Arc<ReminderQueue>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteEvent";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .events
            .delete(&self.event_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.event_id.clone()))
    }

    fn subscribers(&self) -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CancelRemindersOnEventDeleted {
            reminders: self.reminder_queue.clone(),
        })]
    }
}

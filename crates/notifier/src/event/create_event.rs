use super::subscribers::CreateRemindersOnEventCreated;
use crate::notification::reminder_queue::ReminderQueue;
use crate::shared::usecase::{Subscriber, UseCase};
use chronos_domain::{CalendarEvent, EventMember, EventReminder, ID};
use chronos_infra::ChronosContext;
use std::sync::Arc;

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub calendar_id: ID,
    pub creator_id: ID,
    pub title: String,
    pub start_ts: i64,
    pub end_ts: i64,
    pub reminders: Vec<EventReminder>,
    pub members: Vec<EventMember>,
    pub reminder_queue: Arc<ReminderQueue>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidTimespan,
    InvalidReminder,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        if self.end_ts < self.start_ts {
            return Err(UseCaseError::InvalidTimespan);
        }
        for reminder in &self.reminders {
            if !reminder.is_valid() {
                return Err(UseCaseError::InvalidReminder);
            }
        }

        let e = CalendarEvent {
            id: Default::default(),
            title: self.title.clone(),
            calendar_id: self.calendar_id.clone(),
            creator_id: self.creator_id.clone(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            created: ctx.sys.get_timestamp_millis(),
            updated: ctx.sys.get_timestamp_millis(),
            reminders: self.reminders.clone(),
            members: self.members.clone(),
        };

        ctx.repos
            .events
            .insert(&e)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(e)
    }

    fn subscribers(&self) -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(CreateRemindersOnEventCreated {
            reminders: self.reminder_queue.clone(),
        })]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, TestApp};
    use chronos_domain::{InviteStatus, ReminderMethod};
    use crate::shared::usecase::execute;

    #[actix_web::main]
    #[test]
    async fn creates_event_and_schedules_reminders_for_recipients() {
        let TestApp { ctx, reminders, .. } = setup(1_000_000).await;
        let member_id = ID::default();

        let usecase = CreateEventUseCase {
            calendar_id: ID::default(),
            creator_id: ID::default(),
            title: "Standup".into(),
            start_ts: 1_000_000 + 1000 * 60 * 45,
            end_ts: 1_000_000 + 1000 * 60 * 75,
            reminders: vec![EventReminder {
                method: ReminderMethod::Push,
                minutes_before: 10,
            }],
            members: vec![
                EventMember {
                    user_id: Some(member_id),
                    email: "a@example.com".into(),
                    status: InviteStatus::Accepted,
                },
                EventMember {
                    user_id: Some(ID::default()),
                    email: "p@example.com".into(),
                    status: InviteStatus::Pending,
                },
            ],
            reminder_queue: reminders.clone(),
        };

        let event = execute(usecase, &ctx).await.unwrap();

        assert!(ctx.repos.events.find(&event.id).await.is_some());
        // Creator + accepted member
        assert_eq!(reminders.pending_jobs(), 2);
    }

    #[actix_web::main]
    #[test]
    async fn creates_event_without_reminders() {
        let TestApp { ctx, reminders, .. } = setup(1_000_000).await;

        let usecase = CreateEventUseCase {
            calendar_id: ID::default(),
            creator_id: ID::default(),
            title: "Standup".into(),
            start_ts: 500,
            end_ts: 800,
            reminders: Vec::new(),
            members: Vec::new(),
            reminder_queue: reminders.clone(),
        };

        let res = execute(usecase, &ctx).await;
        assert!(res.is_ok());
        assert_eq!(reminders.pending_jobs(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn rejects_event_ending_before_it_starts() {
        let TestApp { ctx, reminders, .. } = setup(1_000_000).await;

        let usecase = CreateEventUseCase {
            calendar_id: ID::default(),
            creator_id: ID::default(),
            title: "Standup".into(),
            start_ts: 800,
            end_ts: 500,
            reminders: Vec::new(),
            members: Vec::new(),
            reminder_queue: reminders.clone(),
        };

        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::InvalidTimespan);
    }

    #[actix_web::main]
    #[test]
    async fn rejects_invalid_reminder() {
        let TestApp { ctx, reminders, .. } = setup(1_000_000).await;

        let usecase = CreateEventUseCase {
            calendar_id: ID::default(),
            creator_id: ID::default(),
            title: "Standup".into(),
            start_ts: 500,
            end_ts: 800,
            reminders: vec![EventReminder {
                method: ReminderMethod::Push,
                minutes_before: -5,
            }],
            members: Vec::new(),
            reminder_queue: reminders.clone(),
        };

        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::InvalidReminder);
    }
}

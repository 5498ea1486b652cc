mod inmemory;

pub use inmemory::InMemoryEventRepo;

use chronos_domain::{CalendarEvent, ID};

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, event: &CalendarEvent) -> anyhow::Result<()>;
    async fn save(&self, event: &CalendarEvent) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<CalendarEvent>;
    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent>;
    /// All events starting after `now` that carry at least one reminder.
    /// This is the reconciler query and needs an index on the start
    /// timestamp in a real store.
    async fn find_upcoming_with_reminders(&self, now: i64) -> anyhow::Result<Vec<CalendarEvent>>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context;
    use chronos_domain::{CalendarEvent, EventReminder, ReminderMethod, ID};

    fn event_factory(start_ts: i64, reminders: Vec<EventReminder>) -> CalendarEvent {
        CalendarEvent {
            id: Default::default(),
            title: "Event".into(),
            calendar_id: Default::default(),
            creator_id: Default::default(),
            start_ts,
            end_ts: start_ts + 1000 * 60 * 60,
            created: 0,
            updated: 0,
            reminders,
            members: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_and_delete() {
        let ctx = setup_context().await;
        let event = event_factory(10, Vec::new());

        assert!(ctx.repos.events.insert(&event).await.is_ok());
        let res = ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(res, event);

        let res = ctx.repos.events.delete(&event.id).await;
        assert_eq!(res, Some(event.clone()));
        assert!(ctx.repos.events.find(&event.id).await.is_none());
    }

    #[tokio::test]
    async fn finds_only_upcoming_events_with_reminders() {
        let ctx = setup_context().await;
        let reminder = EventReminder {
            method: ReminderMethod::Push,
            minutes_before: 10,
        };

        let past = event_factory(50, vec![reminder.clone()]);
        let upcoming_without_reminders = event_factory(500, Vec::new());
        let upcoming = event_factory(500, vec![reminder]);
        for event in [&past, &upcoming_without_reminders, &upcoming].iter() {
            ctx.repos.events.insert(event).await.unwrap();
        }

        let res = ctx
            .repos
            .events
            .find_upcoming_with_reminders(100)
            .await
            .unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].id, upcoming.id);
    }

    #[tokio::test]
    async fn missing_event_is_none() {
        let ctx = setup_context().await;
        assert!(ctx.repos.events.find(&ID::default()).await.is_none());
        assert!(ctx.repos.events.delete(&ID::default()).await.is_none());
    }
}

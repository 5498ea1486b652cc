use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chronos_domain::{CalendarEvent, ID};
use std::sync::Mutex;

pub struct InMemoryEventRepo {
    events: Mutex<Vec<CalendarEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, event: &CalendarEvent) -> anyhow::Result<()> {
        insert(event, &self.events);
        Ok(())
    }

    async fn save(&self, event: &CalendarEvent) -> anyhow::Result<()> {
        save(event, &self.events);
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<CalendarEvent> {
        find(event_id, &self.events)
    }

    async fn delete(&self, event_id: &ID) -> Option<CalendarEvent> {
        delete(event_id, &self.events)
    }

    async fn find_upcoming_with_reminders(&self, now: i64) -> anyhow::Result<Vec<CalendarEvent>> {
        Ok(find_by(&self.events, |e| {
            e.start_ts > now && !e.reminders.is_empty()
        }))
    }
}

use chronos_domain::ID;
use tokio::sync::broadcast;

const BUS_CAPACITY: usize = 256;

/// Domain events published by the calendar/event write paths. The bus is
/// the only coupling between those services and the notification
/// dispatcher: publishing is fire-and-forget, consumers are responsible
/// for handling a payload idempotently.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    EventInviteSent {
        event_id: ID,
        event_title: String,
        invitee_email: String,
        invitee_name: Option<String>,
    },
    CalendarInviteSent {
        calendar_id: ID,
        calendar_title: String,
        invitee_email: String,
        invitee_name: Option<String>,
    },
}

pub struct DomainEventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl DomainEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: DomainEvent) {
        // No receivers is fine; consumers attach at application start.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for DomainEventBus {
    fn default() -> Self {
        Self::new(BUS_CAPACITY)
    }
}

use crate::notification::reminder_queue::ReminderQueue;
use chronos_domain::{CalendarEvent, PushSubscription, PushSubscriptionKeys, User};
use chronos_infra::{
    setup_context, ChronosContext, ISys, InMemoryEmailService, InMemoryPushGateway,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Clock stub whose time the test controls.
pub(crate) struct TestSys {
    now: AtomicI64,
}

impl TestSys {
    pub fn new(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl ISys for TestSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

pub(crate) struct TestApp {
    pub ctx: ChronosContext,
    pub reminders: Arc<ReminderQueue>,
    pub sys: Arc<TestSys>,
    pub email: Arc<InMemoryEmailService>,
    pub push: Arc<InMemoryPushGateway>,
}

/// Fresh context with observable channel doubles and a frozen clock.
pub(crate) async fn setup(now: i64) -> TestApp {
    let mut ctx = setup_context().await;
    let sys = TestSys::new(now);
    let email = Arc::new(InMemoryEmailService::new());
    let push = Arc::new(InMemoryPushGateway::new());
    ctx.sys = sys.clone();
    ctx.services.email = email.clone();
    ctx.services.push = push.clone();
    let reminders = ReminderQueue::new(ctx.clone());
    TestApp {
        ctx,
        reminders,
        sys,
        email,
        push,
    }
}

pub(crate) fn user_with_email_notifications() -> User {
    let mut user = User::new("Maria", "maria@example.com");
    user.preferences.email_notifications = true;
    user
}

pub(crate) fn user_with_push_subscription(endpoint: &str) -> User {
    let mut user = User::new("Maria", "maria@example.com");
    user.push_subscriptions.push(PushSubscription {
        endpoint: endpoint.into(),
        keys: PushSubscriptionKeys {
            p256dh: "BNcRd..".into(),
            auth: "tBHI..".into(),
        },
    });
    user
}

pub(crate) fn event_factory(start_ts: i64) -> CalendarEvent {
    CalendarEvent {
        id: Default::default(),
        title: "Standup".into(),
        calendar_id: Default::default(),
        creator_id: Default::default(),
        start_ts,
        end_ts: start_ts + 1000 * 60 * 60,
        created: 0,
        updated: 0,
        reminders: Vec::new(),
        members: Vec::new(),
    }
}

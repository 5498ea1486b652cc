use crate::notification::send_notification::SendNotificationUseCase;
use crate::shared::usecase::execute;
use actix_web::rt;
use actix_web::rt::time::sleep;
use chronos_domain::{CalendarEvent, NotificationPayload, ReminderMethod, SkipFlags, ID};
use chronos_infra::ChronosContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Identity of a scheduled reminder. At most one live job exists per key
/// at any time; re-scheduling the same key is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub event_id: ID,
    pub user_id: ID,
    pub minutes_before: i64,
    pub method: ReminderMethod,
}

struct ReminderJob {
    event_title: String,
    event_start_ts: i64,
    notify_at_ts: i64,
    /// Armed single-shot timer. Absent while the notify time is still
    /// beyond the scheduling window.
    timer: Option<JoinHandle<()>>,
}

/// In-memory queue of upcoming reminder jobs. The queue owns every job
/// and its timer: event/calendar services and the reconciler go through
/// `schedule_*`/`cancel_event_reminders`, nothing else may touch a job.
pub struct ReminderQueue {
    ctx: ChronosContext,
    jobs: Mutex<HashMap<ReminderKey, ReminderJob>>,
    /// Handed to timer tasks so a fired job can take itself out of the
    /// queue.
    me: Weak<ReminderQueue>,
}

impl fmt::Debug for ReminderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderQueue").finish()
    }
}

impl ReminderQueue {
    pub fn new(ctx: ChronosContext) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            ctx,
            jobs: Mutex::new(HashMap::new()),
            me: me.clone(),
        })
    }

    /// Number of jobs currently tracked, armed or not.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn schedule_event_reminders(&self, event: &CalendarEvent) {
        for reminder in &event.reminders {
            for recipient in event.reminder_recipients() {
                self.schedule_reminder(
                    &event.id,
                    &recipient,
                    &event.title,
                    event.start_ts,
                    reminder.method,
                    reminder.minutes_before,
                );
            }
        }
    }

    pub fn schedule_reminder(
        &self,
        event_id: &ID,
        user_id: &ID,
        event_title: &str,
        event_start_ts: i64,
        method: ReminderMethod,
        minutes_before: i64,
    ) {
        let notify_at_ts = event_start_ts - minutes_before * 60 * 1000;
        let now = self.ctx.sys.get_timestamp_millis();
        // A reminder that should already have fired is dropped silently.
        if notify_at_ts <= now {
            return;
        }

        let window = self.ctx.config.reminder_schedule_window_millis;
        let key = ReminderKey {
            event_id: event_id.clone(),
            user_id: user_id.clone(),
            minutes_before,
            method,
        };

        // The key check and the insert must stay one synchronous block,
        // otherwise an interleaved schedule call could arm the same key
        // twice.
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&key) {
            // Recorded on an earlier pass without a timer. Arm it once the
            // notify time has come inside the scheduling window.
            let delay_millis = job.notify_at_ts - now;
            if job.timer.is_none() && delay_millis <= window {
                job.timer = Some(self.arm_timer(key.clone(), delay_millis));
            }
            return;
        }

        let delay_millis = notify_at_ts - now;
        let timer = if delay_millis <= window {
            Some(self.arm_timer(key.clone(), delay_millis))
        } else {
            None
        };
        debug!(
            "Scheduled reminder for event {} to user {} at {}",
            event_id, user_id, notify_at_ts
        );
        jobs.insert(
            key,
            ReminderJob {
                event_title: event_title.to_string(),
                event_start_ts,
                notify_at_ts,
                timer,
            },
        );
    }

    /// Cancels and removes every job of the event, whatever the recipient
    /// or method. Jobs whose send is already in flight are past
    /// cancellation.
    pub fn cancel_event_reminders(&self, event_id: &ID) {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|key, job| {
            if key.event_id == *event_id {
                if let Some(timer) = job.timer.take() {
                    timer.abort();
                }
                false
            } else {
                true
            }
        });
        let cancelled = before - jobs.len();
        if cancelled > 0 {
            debug!("Cancelled {} reminders for event {}", cancelled, event_id);
        }
    }

    /// Releases every timer and clears the queue. Called when the process
    /// shuts down.
    pub fn shutdown(&self) {
        let mut jobs = self.jobs.lock().unwrap();
        for job in jobs.values_mut() {
            if let Some(timer) = job.timer.take() {
                timer.abort();
            }
        }
        jobs.clear();
    }

    fn arm_timer(&self, key: ReminderKey, delay_millis: i64) -> JoinHandle<()> {
        let queue = self.me.clone();
        rt::spawn(async move {
            sleep(Duration::from_millis(delay_millis as u64)).await;
            if let Some(queue) = queue.upgrade() {
                queue.fire(&key).await;
            }
        })
    }

    /// Fires a due job. The job leaves the queue before any send starts,
    /// so a cancellation racing in past this point finds nothing to
    /// cancel and the job can never fire twice.
    async fn fire(&self, key: &ReminderKey) {
        let job = { self.jobs.lock().unwrap().remove(key) };
        let job = match job {
            Some(job) => job,
            None => return,
        };
        self.send_reminder_notification(key, &job).await;
    }

    async fn send_reminder_notification(&self, key: &ReminderKey, job: &ReminderJob) {
        let now = self.ctx.sys.get_timestamp_millis();
        let minutes_until_event = ((job.event_start_ts - now) as f64 / 60_000.0).round() as i64;
        let time_text = if minutes_until_event < 60 {
            format!("in {} minutes", minutes_until_event)
        } else {
            format!("in {} hours", (minutes_until_event as f64 / 60.0).round() as i64)
        };
        let payload = NotificationPayload {
            title: format!("Reminder: {}", job.event_title),
            message: Some(format!("Event starts {}", time_text)),
            url: Some(format!("/events/{}", key.event_id)),
        };

        match key.method {
            ReminderMethod::Email => {
                let user = match self.ctx.repos.users.find(&key.user_id).await {
                    Some(user) => user,
                    None => {
                        warn!("User {} not found for email reminder", key.user_id);
                        return;
                    }
                };
                if user.email.is_empty() || !user.preferences.email_notifications {
                    return;
                }
                if let Err(e) = self
                    .ctx
                    .services
                    .email
                    .send_generic_notification(
                        &user.email,
                        &payload.title,
                        payload.message.as_deref(),
                        payload.url.as_deref(),
                    )
                    .await
                {
                    error!(
                        "Failed to send email reminder for event {} to user {}: {:?}",
                        key.event_id, key.user_id, e
                    );
                }
            }
            ReminderMethod::Push | ReminderMethod::Telegram => {
                let usecase = SendNotificationUseCase {
                    user_id: key.user_id.clone(),
                    payload,
                    skip: SkipFlags::default(),
                };
                let _ = execute(usecase, &self.ctx).await;
            }
        }
        debug!(
            "Reminder sent for event {} to user {}",
            key.event_id, key.user_id
        );
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self, key: &ReminderKey) -> bool {
        self.jobs
            .lock()
            .unwrap()
            .get(key)
            .map(|job| job.timer.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        setup, user_with_email_notifications, user_with_push_subscription, TestApp,
    };
    use chrono::Utc;

    fn key(event_id: &ID, user_id: &ID, minutes_before: i64, method: ReminderMethod) -> ReminderKey {
        ReminderKey {
            event_id: event_id.clone(),
            user_id: user_id.clone(),
            minutes_before,
            method,
        }
    }

    #[actix_web::main]
    #[test]
    async fn schedule_is_idempotent_per_key() {
        let TestApp { reminders, .. } = setup(1_000_000).await;
        let event_id = ID::default();
        let user_id = ID::default();

        let start_ts = 1_000_000 + 1000 * 60 * 30;
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Push, 10);
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Push, 10);
        assert_eq!(reminders.pending_jobs(), 1);

        // A different method is a different job
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Email, 10);
        assert_eq!(reminders.pending_jobs(), 2);
    }

    #[actix_web::main]
    #[test]
    async fn past_due_reminder_is_dropped() {
        let TestApp { reminders, .. } = setup(1_000_000).await;

        // notify_at == start - 10min == now
        reminders.schedule_reminder(
            &ID::default(),
            &ID::default(),
            "Standup",
            1_000_000 + 1000 * 60 * 10,
            ReminderMethod::Push,
            10,
        );
        assert_eq!(reminders.pending_jobs(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn job_beyond_the_window_is_recorded_without_a_timer() {
        let TestApp { reminders, .. } = setup(1_000_000).await;
        let event_id = ID::default();
        let user_id = ID::default();

        // notify_at is 90 minutes out, the window is 60 minutes
        let start_ts = 1_000_000 + 1000 * 60 * 120;
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Push, 30);

        assert_eq!(reminders.pending_jobs(), 1);
        assert!(!reminders.is_armed(&key(&event_id, &user_id, 30, ReminderMethod::Push)));
    }

    #[actix_web::main]
    #[test]
    async fn recorded_job_is_armed_once_the_window_is_reached() {
        let TestApp { reminders, sys, .. } = setup(1_000_000).await;
        let event_id = ID::default();
        let user_id = ID::default();
        let job_key = key(&event_id, &user_id, 30, ReminderMethod::Push);

        let start_ts = 1_000_000 + 1000 * 60 * 120;
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Push, 30);
        assert!(!reminders.is_armed(&job_key));

        // Half an hour later the notify time is inside the window and a
        // reconciler pass re-offers the same job
        sys.advance(1000 * 60 * 30);
        reminders.schedule_reminder(&event_id, &user_id, "Standup", start_ts, ReminderMethod::Push, 30);
        assert_eq!(reminders.pending_jobs(), 1);
        assert!(reminders.is_armed(&job_key));
    }

    #[actix_web::main]
    #[test]
    async fn cancelling_an_event_drops_all_its_jobs() {
        let TestApp { reminders, .. } = setup(1_000_000).await;
        let event_id = ID::default();
        let other_event_id = ID::default();
        let user_1 = ID::default();
        let user_2 = ID::default();

        let start_ts = 1_000_000 + 1000 * 60 * 30;
        reminders.schedule_reminder(&event_id, &user_1, "Standup", start_ts, ReminderMethod::Push, 10);
        reminders.schedule_reminder(&event_id, &user_2, "Standup", start_ts, ReminderMethod::Push, 10);
        reminders.schedule_reminder(&other_event_id, &user_1, "Retro", start_ts, ReminderMethod::Push, 10);
        assert_eq!(reminders.pending_jobs(), 3);

        reminders.cancel_event_reminders(&event_id);
        assert_eq!(reminders.pending_jobs(), 1);
        assert!(reminders.is_armed(&key(&other_event_id, &user_1, 10, ReminderMethod::Push)));
    }

    #[actix_web::main]
    #[test]
    async fn cancelled_job_never_fires_even_when_about_to_elapse() {
        let now = Utc::now().timestamp_millis();
        let TestApp { email, reminders, ctx, .. } = setup(now).await;
        let user = user_with_email_notifications();
        ctx.repos.users.insert(&user).await.unwrap();

        // Fires in ~50ms unless cancelled
        let event_id = ID::default();
        let start_ts = now + 1000 * 60 + 50;
        reminders.schedule_reminder(&event_id, &user.id, "Standup", start_ts, ReminderMethod::Email, 1);
        assert_eq!(reminders.pending_jobs(), 1);

        reminders.cancel_event_reminders(&event_id);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(reminders.pending_jobs(), 0);
        assert!(email.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn fired_email_reminder_respects_the_preference_flag() {
        let now = Utc::now().timestamp_millis();
        let TestApp { email, reminders, ctx, .. } = setup(now).await;
        let mut user = user_with_email_notifications();
        user.preferences.email_notifications = false;
        ctx.repos.users.insert(&user).await.unwrap();

        let start_ts = now + 1000 * 60 + 50;
        reminders.schedule_reminder(&ID::default(), &user.id, "Standup", start_ts, ReminderMethod::Email, 1);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(reminders.pending_jobs(), 0);
        assert!(email.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn fired_email_reminder_is_delivered_and_leaves_the_queue() {
        let now = Utc::now().timestamp_millis();
        let TestApp { email, reminders, ctx, .. } = setup(now).await;
        let user = user_with_email_notifications();
        ctx.repos.users.insert(&user).await.unwrap();

        let event_id = ID::default();
        let start_ts = now + 1000 * 60 + 50;
        reminders.schedule_reminder(&event_id, &user.id, "Standup", start_ts, ReminderMethod::Email, 1);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(reminders.pending_jobs(), 0);
        let sent = email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, user.email);
        assert_eq!(sent[0].subject, "Reminder: Standup");
        assert!(sent[0].body.contains("Event starts in 1 minutes"));
    }

    #[actix_web::main]
    #[test]
    async fn fired_push_reminder_enters_the_cascade() {
        let now = Utc::now().timestamp_millis();
        let TestApp { push, reminders, ctx, .. } = setup(now).await;
        let user = user_with_push_subscription("https://push.example.com/1");
        ctx.repos.users.insert(&user).await.unwrap();

        let event_id = ID::default();
        let start_ts = now + 1000 * 60 + 50;
        reminders.schedule_reminder(&event_id, &user.id, "Standup", start_ts, ReminderMethod::Push, 1);
        sleep(Duration::from_millis(200)).await;

        assert_eq!(reminders.pending_jobs(), 0);
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://push.example.com/1");
        assert_eq!(sent[0].1.title, "Reminder: Standup");
        assert_eq!(sent[0].1.url, Some(format!("/events/{}", event_id)));
    }

    #[actix_web::main]
    #[test]
    async fn shutdown_clears_the_queue() {
        let TestApp { reminders, .. } = setup(1_000_000).await;
        let start_ts = 1_000_000 + 1000 * 60 * 30;
        reminders.schedule_reminder(&ID::default(), &ID::default(), "A", start_ts, ReminderMethod::Push, 5);
        reminders.schedule_reminder(&ID::default(), &ID::default(), "B", start_ts, ReminderMethod::Push, 5);
        assert_eq!(reminders.pending_jobs(), 2);

        reminders.shutdown();
        assert_eq!(reminders.pending_jobs(), 0);
    }
}

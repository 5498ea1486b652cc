pub mod invite_subscriber;
pub mod reminder_queue;
pub mod send_notification;
pub mod sync_reminders;

mod event;
mod notification;
mod shared;
mod user;

pub use event::{CalendarEvent, EventMember, EventReminder, InviteStatus, ReminderMethod};
pub use notification::{NotificationPayload, SkipFlags};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use user::{PushSubscription, PushSubscriptionKeys, User, UserPreferences};

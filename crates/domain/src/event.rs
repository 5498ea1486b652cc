use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A `CalendarEvent` as stored by the calendar service. The notification
/// core consumes it read-only: reminders and member statuses decide who
/// gets notified and when.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: ID,
    pub title: String,
    pub calendar_id: ID,
    pub creator_id: ID,
    pub start_ts: i64,
    pub end_ts: i64,
    pub created: i64,
    pub updated: i64,
    pub reminders: Vec<EventReminder>,
    pub members: Vec<EventMember>,
}

impl CalendarEvent {
    /// Recipients eligible for reminders: the creator unconditionally,
    /// plus every member that has accepted the invite.
    pub fn reminder_recipients(&self) -> Vec<ID> {
        let mut recipients = vec![self.creator_id.clone()];
        for member in &self.members {
            if let (Some(user_id), InviteStatus::Accepted) = (&member.user_id, member.status) {
                recipients.push(user_id.clone());
            }
        }
        recipients
    }
}

impl Entity for CalendarEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventReminder {
    pub method: ReminderMethod,
    pub minutes_before: i64,
}

impl EventReminder {
    // This isnt ideal at all, shouldnt be possible to construct
    // this type if it is not valid, but for now it is good enough
    pub fn is_valid(&self) -> bool {
        self.minutes_before >= 0 && self.minutes_before <= 60 * 24 * 7
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Push,
    Telegram,
}

impl Display for ReminderMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Push => write!(f, "push"),
            Self::Telegram => write!(f, "telegram"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// An invited event participant. `user_id` is empty until the invitee
/// signs up with the invited email address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventMember {
    pub user_id: Option<ID>,
    pub email: String,
    pub status: InviteStatus,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reminder_recipients_includes_creator_and_accepted_members_only() {
        let accepted = ID::default();
        let event = CalendarEvent {
            id: Default::default(),
            title: "Standup".into(),
            calendar_id: Default::default(),
            creator_id: Default::default(),
            start_ts: 0,
            end_ts: 0,
            created: 0,
            updated: 0,
            reminders: Vec::new(),
            members: vec![
                EventMember {
                    user_id: Some(accepted.clone()),
                    email: "a@b.com".into(),
                    status: InviteStatus::Accepted,
                },
                EventMember {
                    user_id: Some(ID::default()),
                    email: "p@b.com".into(),
                    status: InviteStatus::Pending,
                },
                EventMember {
                    user_id: None,
                    email: "n@b.com".into(),
                    status: InviteStatus::Accepted,
                },
            ],
        };

        let recipients = event.reminder_recipients();
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0], event.creator_id);
        assert_eq!(recipients[1], accepted);
    }
}

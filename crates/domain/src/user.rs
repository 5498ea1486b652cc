use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// A registered `User`. This core only ever reads users, except for the
/// push subscription list which is pruned when a subscription turns out
/// to be expired.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub preferences: UserPreferences,
    pub push_subscriptions: Vec<PushSubscription>,
}

impl User {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: Default::default(),
            name: name.to_string(),
            email: email.to_string(),
            preferences: Default::default(),
            push_subscriptions: Vec::new(),
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub email_notifications: bool,
    pub telegram_notifications: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            email_notifications: false,
            telegram_notifications: false,
        }
    }
}

/// A browser push subscription as handed out by the push service the
/// client registered with. The endpoint is the delivery address and also
/// the identity used when pruning expired subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushSubscriptionKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushSubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use chronos_domain::{PushSubscription, User, ID};
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        insert(user, &self.users);
        Ok(())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        save(user, &self.users);
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        find(user_id, &self.users)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        find_by(&self.users, |u| u.email == email).into_iter().next()
    }

    async fn add_push_subscription(
        &self,
        user_id: &ID,
        subscription: &PushSubscription,
    ) -> anyhow::Result<()> {
        update_many(
            &self.users,
            |u| u.id == *user_id,
            |u| {
                if !u
                    .push_subscriptions
                    .iter()
                    .any(|s| s.endpoint == subscription.endpoint)
                {
                    u.push_subscriptions.push(subscription.clone());
                }
            },
        );
        Ok(())
    }

    async fn remove_push_subscriptions(
        &self,
        user_id: &ID,
        endpoints: &[String],
    ) -> anyhow::Result<()> {
        update_many(
            &self.users,
            |u| u.id == *user_id,
            |u| {
                u.push_subscriptions
                    .retain(|s| !endpoints.contains(&s.endpoint));
            },
        );
        Ok(())
    }
}

mod inmemory;

pub use inmemory::InMemoryUserRepo;

use chronos_domain::{PushSubscription, User, ID};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
    async fn add_push_subscription(
        &self,
        user_id: &ID,
        subscription: &PushSubscription,
    ) -> anyhow::Result<()>;
    /// Drops the given endpoints from the user's stored push
    /// subscriptions. Endpoints not present are ignored.
    async fn remove_push_subscriptions(
        &self,
        user_id: &ID,
        endpoints: &[String],
    ) -> anyhow::Result<()>;
}

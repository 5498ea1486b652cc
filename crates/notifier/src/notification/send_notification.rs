use crate::shared::usecase::UseCase;
use chronos_domain::{NotificationPayload, SkipFlags, ID};
use chronos_infra::{ChronosContext, PushDeliveryStatus, SseChannel};
use futures::future::join_all;
use tracing::{debug, error, warn};

/// Delivers a single notification to a single user through the best
/// available channel. Socket and SSE short-circuit the cascade once they
/// deliver; web push does not: email stays additive alongside push. That
/// asymmetry is kept on purpose for compatibility with the existing
/// behavior.
#[derive(Debug)]
pub struct SendNotificationUseCase {
    pub user_id: ID,
    pub payload: NotificationPayload,
    pub skip: SkipFlags,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for SendNotificationUseCase {
    /// Whether any channel accepted the notification
    type Response = bool;

    type Error = UseCaseError;

    const NAME: &'static str = "SendNotification";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        // Priority 1: realtime socket
        if !self.skip.socket && ctx.services.socket.send_to_user(&self.user_id, &self.payload) {
            debug!("Notification sent via socket to user {}", self.user_id);
            return Ok(true);
        }

        let user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) => user,
            None => {
                warn!("User {} not found", self.user_id);
                return Ok(false);
            }
        };

        // SSE fallback
        if !self.skip.sse && ctx.services.sse.has_subscription(&self.user_id) {
            ctx.services
                .sse
                .emit(&SseChannel::user_channel(&self.user_id), &self.payload);
            debug!("Notification sent via SSE to user {}", self.user_id);
            return Ok(true);
        }

        let mut delivered = false;

        // Priority 2: web push, all subscriptions at once
        if !self.skip.push && !user.push_subscriptions.is_empty() {
            let sends = user
                .push_subscriptions
                .iter()
                .map(|subscription| ctx.services.push.send(subscription, &self.payload));
            let statuses = join_all(sends).await;

            let mut succeeded = 0;
            let mut expired = Vec::new();
            for (subscription, status) in user.push_subscriptions.iter().zip(statuses) {
                match status {
                    PushDeliveryStatus::Delivered => succeeded += 1,
                    PushDeliveryStatus::Expired => expired.push(subscription.endpoint.clone()),
                    PushDeliveryStatus::Failed => {}
                }
            }

            if succeeded > 0 {
                debug!(
                    "Notification sent via web push to {} devices for user {}",
                    succeeded, self.user_id
                );
                delivered = true;
            }

            // Cleanup only; a failed prune must not fail the dispatch.
            if !expired.is_empty() {
                match ctx
                    .repos
                    .users
                    .remove_push_subscriptions(&self.user_id, &expired)
                    .await
                {
                    Ok(()) => debug!(
                        "Removed {} expired push subscriptions for user {}",
                        expired.len(),
                        self.user_id
                    ),
                    Err(e) => error!(
                        "Unable to remove {} expired push subscriptions for user {}: {:?}",
                        expired.len(),
                        self.user_id,
                        e
                    ),
                }
            }
        }

        // Email is additive: it is evaluated even when push succeeded.
        if !self.skip.email && !user.email.is_empty() && user.preferences.email_notifications {
            match ctx
                .services
                .email
                .send_generic_notification(
                    &user.email,
                    &self.payload.title,
                    self.payload.message.as_deref(),
                    self.payload.url.as_deref(),
                )
                .await
            {
                Ok(()) => {
                    debug!("Notification sent via email to user {}", self.user_id);
                    delivered = true;
                }
                Err(e) => error!(
                    "Failed to send notification email to user {}: {:?}",
                    self.user_id, e
                ),
            }
        }

        if !delivered {
            warn!("No notification channel available for user {}", self.user_id);
        }
        Ok(delivered)
    }
}

use crate::notification::send_notification::SendNotificationUseCase;
use crate::shared::usecase::execute;
use chronos_domain::{NotificationPayload, SkipFlags};
use chronos_infra::{ChronosContext, DomainEvent};
use tracing::debug;

/// Turns invite events from the domain bus into notifications. The invite
/// flows send their own templated email, so the email channel is
/// suppressed here to avoid double delivery.
pub async fn handle_domain_event(event: DomainEvent, ctx: &ChronosContext) {
    match event {
        DomainEvent::EventInviteSent {
            event_id,
            event_title,
            invitee_email,
            ..
        } => {
            let payload = NotificationPayload {
                title: "Event Invitation".into(),
                message: Some(format!("You've been invited to: {}", event_title)),
                url: Some(format!("/events/{}", event_id)),
            };
            notify_invitee(&invitee_email, payload, ctx).await;
        }
        DomainEvent::CalendarInviteSent {
            calendar_id,
            calendar_title,
            invitee_email,
            ..
        } => {
            let payload = NotificationPayload {
                title: "Calendar Invitation".into(),
                message: Some(format!("You've been invited to calendar: {}", calendar_title)),
                url: Some(format!("/calendars/{}", calendar_id)),
            };
            notify_invitee(&invitee_email, payload, ctx).await;
        }
    }
}

async fn notify_invitee(invitee_email: &str, payload: NotificationPayload, ctx: &ChronosContext) {
    let user = match ctx.repos.users.find_by_email(invitee_email).await {
        Some(user) => user,
        None => {
            debug!(
                "Invitee {} has no account yet, skipping notification",
                invitee_email
            );
            return;
        }
    };

    let usecase = SendNotificationUseCase {
        user_id: user.id.clone(),
        payload,
        skip: SkipFlags {
            email: true,
            ..Default::default()
        },
    };
    let _ = execute(usecase, ctx).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup, user_with_email_notifications, TestApp};
    use chronos_domain::ID;
    use chronos_infra::SseChannel;

    #[actix_web::main]
    #[test]
    async fn event_invite_notifies_without_email() {
        let TestApp { ctx, email, .. } = setup(1_000_000).await;
        let user = user_with_email_notifications();
        ctx.repos.users.insert(&user).await.unwrap();

        let channel = SseChannel::user_channel(&user.id);
        let mut rx = ctx.services.sse.subscribe(&channel);
        ctx.services.sse.add_subscription(&user.id, &channel);

        let event_id = ID::default();
        handle_domain_event(
            DomainEvent::EventInviteSent {
                event_id: event_id.clone(),
                event_title: "Standup".into(),
                invitee_email: user.email.clone(),
                invitee_name: None,
            },
            &ctx,
        )
        .await;

        let payload = rx.try_recv().unwrap();
        assert_eq!(payload.title, "Event Invitation");
        assert_eq!(payload.message, Some("You've been invited to: Standup".into()));
        assert_eq!(payload.url, Some(format!("/events/{}", event_id)));
        // The invite flow already emailed the invitee
        assert!(email.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn calendar_invite_notifies_the_invitee() {
        let TestApp { ctx, .. } = setup(1_000_000).await;
        let user = user_with_email_notifications();
        ctx.repos.users.insert(&user).await.unwrap();

        let channel = SseChannel::user_channel(&user.id);
        let mut rx = ctx.services.sse.subscribe(&channel);
        ctx.services.sse.add_subscription(&user.id, &channel);

        let calendar_id = ID::default();
        handle_domain_event(
            DomainEvent::CalendarInviteSent {
                calendar_id: calendar_id.clone(),
                calendar_title: "Team".into(),
                invitee_email: user.email.clone(),
                invitee_name: Some("Maria".into()),
            },
            &ctx,
        )
        .await;

        let payload = rx.try_recv().unwrap();
        assert_eq!(payload.title, "Calendar Invitation");
        assert_eq!(payload.url, Some(format!("/calendars/{}", calendar_id)));
    }

    #[actix_web::main]
    #[test]
    async fn unknown_invitee_is_skipped() {
        let TestApp { ctx, email, .. } = setup(1_000_000).await;

        handle_domain_event(
            DomainEvent::EventInviteSent {
                event_id: ID::default(),
                event_title: "Standup".into(),
                invitee_email: "stranger@example.com".into(),
                invitee_name: None,
            },
            &ctx,
        )
        .await;

        assert!(email.sent().is_empty());
    }
}

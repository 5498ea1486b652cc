use crate::shared::usecase::UseCase;
use chronos_domain::{CalendarEvent, EventMember, InviteStatus, ID};
use chronos_infra::{ChronosContext, DomainEvent};
use tracing::error;

/// Invites an email address to an event. The invitee joins as a pending
/// member, gets the invite email right away and, through the domain bus,
/// an in-app notification if the address belongs to a registered user.
#[derive(Debug)]
pub struct InviteMemberUseCase {
    pub event_id: ID,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    AlreadyInvited(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for InviteMemberUseCase {
    type Response = CalendarEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "InviteMember";

    async fn execute(&mut self, ctx: &ChronosContext) -> Result<Self::Response, Self::Error> {
        let mut event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.event_id.clone()))?;

        if event.members.iter().any(|m| m.email == self.email) {
            return Err(UseCaseError::AlreadyInvited(self.email.clone()));
        }

        let user = ctx.repos.users.find_by_email(&self.email).await;
        event.members.push(EventMember {
            user_id: user.map(|u| u.id),
            email: self.email.clone(),
            status: InviteStatus::Pending,
        });

        ctx.repos
            .events
            .save(&event)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        if let Err(e) = ctx
            .services
            .email
            .send_event_invite(&self.email, &event.title)
            .await
        {
            error!("Failed to send event invite email to {}: {:?}", self.email, e);
        }

        // The bus consumer suppresses the email channel since the invite
        // email above already went out.
        ctx.bus.publish(DomainEvent::EventInviteSent {
            event_id: event.id.clone(),
            event_title: event.title.clone(),
            invitee_email: self.email.clone(),
            invitee_name: self.name.clone(),
        });

        Ok(event)
    }
}

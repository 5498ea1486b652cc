mod email;
mod push;
mod socket;
mod sse;

pub use email::{IEmailService, InMemoryEmailService, OutgoingEmail, SmtpEmailService};
pub use push::{HttpPushGateway, IPushGateway, InMemoryPushGateway, PushDeliveryStatus};
pub use socket::SocketChannel;
pub use sse::SseChannel;

use crate::config::Config;
use std::sync::Arc;
use tracing::{info, warn};

/// The delivery channels available to the notification dispatcher.
#[derive(Clone)]
pub struct Services {
    pub socket: Arc<SocketChannel>,
    pub sse: Arc<SseChannel>,
    pub push: Arc<dyn IPushGateway>,
    pub email: Arc<dyn IEmailService>,
}

impl Services {
    pub fn create(config: &Config) -> Self {
        let email: Arc<dyn IEmailService> = match &config.smtp {
            Some(smtp) => match SmtpEmailService::new(smtp) {
                Ok(service) => Arc::new(service),
                Err(e) => {
                    warn!(
                        "Unable to create the SMTP transport: {:?}. Outgoing email will be kept in memory.",
                        e
                    );
                    Arc::new(InMemoryEmailService::new())
                }
            },
            None => {
                info!("SMTP is not configured. Outgoing email will be kept in memory.");
                Arc::new(InMemoryEmailService::new())
            }
        };

        Self {
            socket: Arc::new(SocketChannel::new()),
            sse: Arc::new(SseChannel::new()),
            push: Arc::new(HttpPushGateway::new(config.vapid.clone())),
            email,
        }
    }
}

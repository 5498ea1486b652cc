use crate::config::SmtpConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Mutex;

#[async_trait::async_trait]
pub trait IEmailService: Send + Sync {
    async fn send_generic_notification(
        &self,
        email: &str,
        title: &str,
        message: Option<&str>,
        url: Option<&str>,
    ) -> anyhow::Result<()>;

    async fn send_event_invite(&self, email: &str, event_title: &str) -> anyhow::Result<()>;
}

pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(&config.uri)?.build();
        let from = config.from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

fn notification_body(title: &str, message: Option<&str>, url: Option<&str>) -> String {
    let mut body = format!("<h2>{}</h2>", title);
    if let Some(message) = message {
        body.push_str(&format!("<p>{}</p>", message));
    }
    if let Some(url) = url {
        body.push_str(&format!("<p><a href=\"{}\">Open in Chronos</a></p>", url));
    }
    body
}

#[async_trait::async_trait]
impl IEmailService for SmtpEmailService {
    async fn send_generic_notification(
        &self,
        email: &str,
        title: &str,
        message: Option<&str>,
        url: Option<&str>,
    ) -> anyhow::Result<()> {
        self.send(email, title, notification_body(title, message, url))
            .await
    }

    async fn send_event_invite(&self, email: &str, event_title: &str) -> anyhow::Result<()> {
        let body = notification_body(
            "Event Invitation",
            Some(&format!("You've been invited to: {}", event_title)),
            None,
        );
        self.send(email, "Event Invitation", body).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email sink used when SMTP is not configured, and by tests to observe
/// what would have been sent.
pub struct InMemoryEmailService {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl InMemoryEmailService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEmailService for InMemoryEmailService {
    async fn send_generic_notification(
        &self,
        email: &str,
        title: &str,
        message: Option<&str>,
        url: Option<&str>,
    ) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(OutgoingEmail {
            to: email.to_string(),
            subject: title.to_string(),
            body: notification_body(title, message, url),
        });
        Ok(())
    }

    async fn send_event_invite(&self, email: &str, event_title: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(OutgoingEmail {
            to: email.to_string(),
            subject: "Event Invitation".to_string(),
            body: notification_body(
                "Event Invitation",
                Some(&format!("You've been invited to: {}", event_title)),
                None,
            ),
        });
        Ok(())
    }
}

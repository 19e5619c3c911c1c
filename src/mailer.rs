use std::env;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("invalid message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("mail transport is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP mailer over STARTTLS with a bounded connection timeout, configured
/// from the same env variables the deployment already uses.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_env() -> Result<Option<Self>, MailError> {
        let (Ok(username), Ok(password)) = (env::var("MAIL_USERNAME"), env::var("MAIL_PASSWORD"))
        else {
            return Ok(None);
        };
        let server = env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = env::var("MAIL_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(587);

        let from: Mailbox = username.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&server)?
            .port(port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Some(Self { transport, from }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Stand-in used when SMTP credentials are absent. It fails the send so the
/// reminder flag stays unset and the reservation is retried once mail is
/// configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        log::warn!("mail transport not configured; would have sent '{subject}' to {to}");
        Err(MailError::NotConfigured)
    }
}

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("smtp relay failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl EmailError {
    /// Caller-input errors map to 400 at the request boundary; everything
    /// else is a relay failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, EmailError::MissingField(_) | EmailError::Address(_))
    }
}

/// Relays contact-form submissions to a fixed recipient over authenticated
/// SMTP.
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl EmailService {
    pub fn new(
        smtp_server: &str,
        username: String,
        password: String,
        recipient: String,
    ) -> Result<Self, EmailError> {
        let sender: Mailbox = username.parse()?;
        let recipient: Mailbox = recipient.parse()?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_server)?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            mailer,
            sender,
            recipient,
        })
    }

    /// Relay one contact-form submission. All three fields must be non-blank;
    /// validation failures never touch the network. Transport failures are
    /// surfaced, not retried.
    pub async fn send_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let name = name.trim();
        let email = email.trim();
        let message = message.trim();

        if name.is_empty() {
            return Err(EmailError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(EmailError::MissingField("email"));
        }
        if message.is_empty() {
            return Err(EmailError::MissingField("message"));
        }

        let reply_to: Mailbox = format!("{name} <{email}>").parse()?;
        let mail = Message::builder()
            .from(self.sender.clone())
            .reply_to(reply_to)
            .to(self.recipient.clone())
            .subject("New contact form submission")
            .header(ContentType::TEXT_PLAIN)
            .body(format!("From: {name} <{email}>\n\n{message}"))?;

        self.mailer.send(mail).await?;
        info!("contact message from {email} relayed");
        Ok(())
    }
}

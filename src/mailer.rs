//! Digest delivery over SMTP.
//!
//! Every recipient gets an individual message. A failure for one address is
//! logged and the remaining recipients are still attempted; the run counts
//! as delivered when at least one message went out.

use chrono::{DateTime, Local};
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use crate::config::SmtpSecurity;
use crate::editions::Edition;
use crate::error::{Error, Result};

/// A rendered digest ready to be mailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// e.g. `🌍 International News Digest - 12 New Articles - May 06, 2025`
pub fn subject(edition: Edition, article_count: usize, at: &DateTime<Local>) -> String {
    format!(
        "{} {} - {} New Articles - {}",
        edition.icon(),
        edition.title(),
        article_count,
        at.format("%b %d, %Y")
    )
}

/// Sends one message to one recipient.
pub trait Mailer {
    async fn send(&self, recipient: &str, message: &DigestMessage) -> Result<()>;
}

/// Outcome of a delivery pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.sent > 0
    }
}

/// Send `message` to each recipient in turn, pausing `delay` between them.
#[instrument(level = "info", skip_all, fields(recipients = recipients.len()))]
pub async fn dispatch<M: Mailer>(
    mailer: &M,
    recipients: &[String],
    message: &DigestMessage,
    delay: Duration,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for (i, recipient) in recipients.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        match mailer.send(recipient, message).await {
            Ok(()) => {
                info!(%recipient, "Email sent");
                report.sent += 1;
            }
            Err(e) => {
                error!(%recipient, error = %e, "Failed to send email");
                report.failed.push(recipient.clone());
            }
        }
    }
    info!(sent = report.sent, total = recipients.len(), "Delivery finished");
    report
}

/// SMTP connection settings resolved from the configuration.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("from", &self.from)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| Error::Config(format!("invalid sender address {}: {e}", settings.from)))?;

        let builder = match settings.security {
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host),
            SmtpSecurity::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
        }
        .map_err(|e| Error::Delivery(format!("failed to create SMTP transport: {e}")))?
        .port(settings.port);

        let transport = match &settings.password {
            Some(password) => {
                let username = settings.username.clone().unwrap_or_else(|| settings.from.clone());
                builder.credentials(Credentials::new(username, password.clone())).build()
            }
            None => builder.build(),
        };

        Ok(Self { transport, from })
    }

    fn build_message(&self, recipient: &str, message: &DigestMessage) -> Result<Message> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| Error::Delivery(format!("invalid recipient {recipient}: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(message.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html.clone()),
                    ),
            )
            .map_err(|e| Error::Delivery(format!("failed to build email: {e}")))
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, recipient: &str, message: &DigestMessage) -> Result<()> {
        let email = self.build_message(recipient, message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;
        Ok(())
    }
}

//! Outbound mail: the notification message, the delivery port, and its
//! transports. Creation-time logic composes an [`AchievementMail`] and hands
//! it to a [`Mailer`]; what happens to it afterwards is the transport's
//! concern.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{error, info, instrument};

/// A notification about a freshly created achievement, already addressed
/// and worded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl AchievementMail {
    /// Compose the congratulation mail for a newly created achievement.
    /// The body carries a stable link to the record.
    pub fn achievement_created(recipient: &str, achievement_id: i32, base_url: &str) -> Self {
        Self {
            to: recipient.to_string(),
            subject: "Congratulations".to_string(),
            body: format!(
                "You just earned a new achievement!\n\nSee it here: {}/achievements/{}\n",
                base_url.trim_end_matches('/'),
                achievement_id
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// The delivery port. An `Ok` return means the message was accepted for
/// delivery, not that it arrived; senders never wait on the outcome.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, mail: AchievementMail) -> Result<(), MailError>;
}

/// Delivers over SMTP using lettre's tokio transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp_url: &str, from: &str) -> Result<Self, MailError> {
        Ok(Self {
            transport: AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)?.build(),
            from: from.parse()?,
        })
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    /// Builds the message, then detaches the actual SMTP exchange onto a
    /// background task. Construction problems (a malformed recipient, say)
    /// surface at handoff; wire failures are only logged.
    #[instrument(skip(self))]
    async fn send(&self, mail: AchievementMail) -> Result<(), MailError> {
        let AchievementMail { to, subject, body } = mail;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        let transport = self.transport.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.send(message).await {
                error!("SMTP delivery failed: {}", e);
            }
        });

        Ok(())
    }
}

/// Stand-in transport used when SMTP is not configured. The handoff is
/// logged so local runs still show the outbound traffic.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: AchievementMail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            "mail handed off to log transport"
        );
        Ok(())
    }
}

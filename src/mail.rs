//! Mail composition and SMTP submission
//!
//! Builds a `multipart/mixed` message (plain-text body followed by one
//! attachment part per downloaded file) and submits it over an authenticated
//! STARTTLS session. Submission sits behind the [`MailSender`] trait so tests
//! can capture outgoing mail without a server.

use crate::config::SmtpConfig;
use crate::error::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A fully specified outbound email
#[derive(Clone, Debug)]
pub struct OutgoingEmail {
    /// Sender address (also the SMTP username in the shipped binary)
    pub from: String,

    /// Recipient addresses
    pub recipients: Vec<String>,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,

    /// Files to attach, in order
    pub attachments: Vec<PathBuf>,
}

/// Build the MIME message for an outbound email
///
/// The message carries the plain-text body first and one attachment part per
/// file, each with the file's basename and a content type guessed from its
/// extension. lettre stamps the Date header when the message is built.
///
/// # Errors
/// Fails when an address does not parse, an attachment cannot be read, or
/// the message cannot be assembled.
pub fn build_message(email: &OutgoingEmail) -> Result<Message> {
    let from: Mailbox = email.from.parse()?;

    let mut builder = Message::builder().from(from).subject(email.subject.clone());
    for recipient in &email.recipients {
        builder = builder.to(recipient.parse()?);
    }

    let mut multipart = MultiPart::mixed().singlepart(
        SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone()),
    );

    for path in &email.attachments {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("attachment")
            .to_string();
        let content = std::fs::read(path)?;
        multipart = multipart.singlepart(Attachment::new(filename).body(content, content_type_for(path)));
    }

    Ok(builder.multipart(multipart)?)
}

/// Content type for an attachment, guessed from the file extension
fn content_type_for(path: &Path) -> ContentType {
    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    };
    // The candidates above are all well-formed, so the fallback is unreachable
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}

/// Transport seam for submitting a composed email
///
/// The shipped binary uses [`SmtpMailer`]; tests substitute a recording
/// implementation.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Compose and submit `email`
    ///
    /// # Errors
    /// Returns an error when composition or submission fails; the pipeline
    /// aborts without updating the marker.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Sends mail over SMTP with a STARTTLS upgrade and LOGIN authentication
pub struct SmtpMailer {
    /// Configured transport (connections are opened per send)
    transport: AsyncSmtpTransport<Tokio1Executor>,

    /// Server hostname, kept for logging
    host: String,
}

impl SmtpMailer {
    /// Create a mailer from SMTP configuration
    ///
    /// # Errors
    /// Returns an error if the relay parameters are invalid
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = build_message(email)?;

        debug!(
            host = %self.host,
            recipients = email.recipients.len(),
            attachments = email.attachments.len(),
            "submitting mail"
        );
        self.transport.send(message).await?;

        info!(subject = %email.subject, "mail sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

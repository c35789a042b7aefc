//! The mail transport seam and its SMTP implementation.

use super::message::OutgoingMessage;
use crate::core::config::{SmtpSettings, TlsPolicy};
use crate::core::error::{AppError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivers one addressed message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Returns the server's acknowledgment on success.
    async fn send(&self, message: &OutgoingMessage) -> Result<String>;
}

/// SMTP delivery through a relay, one connection per message.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let tls = match settings.tls {
            TlsPolicy::None => Tls::None,
            policy => {
                let params = TlsParameters::builder(settings.host.clone())
                    .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
                    .build()?;
                match policy {
                    TlsPolicy::Opportunistic => Tls::Opportunistic(params),
                    TlsPolicy::Wrapper => Tls::Wrapper(params),
                    _ => Tls::Required(params),
                }
            }
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.as_str())
            .port(settings.port)
            .tls(tls)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain])
            .timeout(Some(settings.timeout))
            .build();

        tracing::debug!(
            target: "dispatch",
            "SMTP transport ready for {}:{} ({:?})",
            settings.host,
            settings.port,
            settings.tls
        );
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &OutgoingMessage) -> Result<String> {
        let email = build_message(message)?;
        let response = self.transport.send(email).await?;
        Ok(response.message().collect::<Vec<_>>().join(" "))
    }
}

/// Converts an [`OutgoingMessage`] into a MIME message.
pub fn build_message(message: &OutgoingMessage) -> Result<Message> {
    let from: Mailbox = message.from.parse()?;
    let to: Mailbox = message.to.parse()?;

    let content_type = if message.html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };
    let body = SinglePart::builder()
        .header(content_type)
        .body(message.body.clone());

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone());

    if message.attachments.is_empty() {
        return Ok(builder.singlepart(body)?);
    }

    let octet_stream = ContentType::parse("application/octet-stream")
        .map_err(|e| AppError::MessageBuild(format!("invalid attachment content type: {}", e)))?;
    let mut parts = MultiPart::mixed().singlepart(body);
    for file in &message.attachments {
        parts = parts.singlepart(
            Attachment::new(file.filename.clone()).body(file.content.clone(), octet_stream.clone()),
        );
    }
    Ok(builder.multipart(parts)?)
}

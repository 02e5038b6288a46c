//! SMTP transport on `lettre`.

use super::{Email, Mailer, NotifyError};
use crate::config::SmtpSettings;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// Implicit-TLS submission port; every other port upgrades with STARTTLS.
const SMTPS_PORT: u16 = 465;

/// Sends through an SMTP relay. Connection and refusal errors are reported as
/// [`NotifyError::Delivery`], so the dispatcher retries them.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let builder = if settings.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| NotifyError::Delivery(format!("SMTP relay {}: {e}", settings.host)))?;

        let mut builder = builder.port(settings.port);
        if let Some(username) = &settings.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                settings.password.clone().unwrap_or_default(),
            ));
        }
        info!(host = %settings.host, port = settings.port, "SMTP mailer configured");
        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn mailbox(raw: &str) -> Result<Mailbox, NotifyError> {
    raw.parse()
        .map_err(|e| NotifyError::Delivery(format!("invalid address {raw:?}: {e}")))
}

/// Builds the MIME message: the text body first, then one part per attachment.
pub fn build_message(email: &Email) -> Result<Message, NotifyError> {
    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
    for attachment in &email.attachments {
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|e| NotifyError::Delivery(format!("{}: {e}", attachment.content_type)))?;
        parts = parts.singlepart(
            MailAttachment::new(attachment.filename.clone())
                .body(attachment.content.clone(), content_type),
        );
    }

    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.clone())
        .multipart(parts)
        .map_err(|e| NotifyError::Delivery(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let message = build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        debug!(to = %email.to, "SMTP accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Attachment;

    fn email() -> Email {
        Email {
            from: "shop@keyshop.mg".into(),
            to: "hery@client.mg".into(),
            subject: "Your invoice ACHAT-4".into(),
            body: "INVOICE\n".into(),
            attachments: vec![Attachment {
                filename: "ACHAT-4.pdf".into(),
                content_type: "application/pdf".into(),
                content: b"%PDF-1.5 test".to_vec(),
            }],
        }
    }

    #[test]
    fn test_message_carries_the_attachment() {
        let message = build_message(&email()).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("Subject: Your invoice ACHAT-4"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("ACHAT-4.pdf"));
        assert!(raw.contains("INVOICE"));
    }

    #[test]
    fn test_bad_address_is_a_delivery_error() {
        let mut email = email();
        email.to = "not an address".into();
        assert!(matches!(
            build_message(&email),
            Err(NotifyError::Delivery(_))
        ));
    }

    #[tokio::test]
    async fn test_builds_for_both_tls_modes() {
        for port in [465, 587] {
            let settings = SmtpSettings {
                host: "smtp.keyshop.mg".into(),
                port,
                username: Some("mailer".into()),
                password: None,
            };
            assert!(SmtpMailer::new(&settings).is_ok());
        }
    }
}

use anyhow::Context as _;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::Mailer;
use crate::error::ApiError;

/// SMTP mailer over lettre's async transport. Fire-and-forget from the
/// flows' perspective — a failure surfaces as a generic server error and
/// nothing is retried.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// `smtp_url` accepts the usual schemes (`smtp://`, `smtps://`), with
    /// credentials embedded in the URL.
    pub fn new(smtp_url: &str, from: &str) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)
            .context("parse SMTP url")?
            .build();
        let from = from.parse::<Mailbox>().context("parse SMTP from address")?;
        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("parse recipient address: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_owned())
            .context("build email")?;
        self.transport.send(message).await.context("send email")?;
        Ok(())
    }
}

use crate::config::MailConfig;
use crate::error::{Result, WatchError};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the rendered digest as one message.
    async fn deliver(&self, html: &str) -> Result<()>;
}

/// STARTTLS relay session with login; one message per `deliver`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    subject: String,
    relay: String,
}

impl SmtpMailer {
    /// Addresses are validated here so a typo fails before the feed is fetched.
    pub fn new(config: &MailConfig, recipients: &[String], password: String) -> Result<Self> {
        let from: Mailbox = config.from.parse().map_err(|e| {
            WatchError::Config(format!("invalid sender address {:?}: {}", config.from, e))
        })?;
        let to = recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>().map_err(|e| {
                    WatchError::Config(format!("invalid recipient address {:?}: {}", r, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if to.is_empty() {
            return Err(WatchError::Config("at least one recipient is required".into()));
        }

        let credentials = Credentials::new(from.email.to_string(), password);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| WatchError::Config(format!("invalid SMTP relay {}: {}", config.smtp_host, e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_millis(config.timeout_ms)))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject: config.subject.clone(),
            relay: format!("{}:{}", config.smtp_host, config.smtp_port),
        })
    }

    fn build_message(&self, html: &str) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(self.subject.clone());
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(html.to_string())))
            .map_err(|e| WatchError::Delivery(format!("failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, html: &str) -> Result<()> {
        let message = self.build_message(html)?;

        tracing::debug!(relay = %self.relay, recipients = self.to.len(), "sending digest");
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| WatchError::Delivery(format!("{} via {}", e, self.relay)))?;

        tracing::debug!(code = %response.code(), "relay accepted message");
        Ok(())
    }
}

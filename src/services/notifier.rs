// src/services/notifier.rs

//! Change notification over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::NotifyError;
use crate::models::{EmailConfig, SmtpConfig};

/// Sink for "this page changed" events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the configured recipients that `url` changed.
    async fn notify(&self, url: &str) -> Result<(), NotifyError>;
}

/// Sends one email per change, opening a fresh SMTP session each time.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the notification message for `url`.
    pub fn build_message(&self, url: &str) -> Result<Message, NotifyError> {
        let recipients = self.config.recipients();
        if recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let sender = self.config.sender().unwrap_or_default();
        let from = Mailbox::new(
            Some(self.config.sender_name.clone()),
            parse_address(sender)?,
        );

        let mut builder = Message::builder()
            .from(from)
            .subject(self.config.subject.as_str())
            .header(ContentType::TEXT_HTML);
        for recipient in recipients {
            builder = builder.to(Mailbox::new(None, parse_address(recipient)?));
        }

        let message = builder.body(render_body(url))?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let smtp = &self.config.smtp;
        let builder = if smtp.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else {
            // STARTTLS is used when the server advertises it
            let params = TlsParameters::new(smtp.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .tls(Tls::Opportunistic(params))
        };

        let builder = builder.port(smtp.resolved_port());
        let builder = match credentials(smtp) {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };
        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, url: &str) -> Result<(), NotifyError> {
        let message = self.build_message(url)?;
        let transport = self.transport()?;

        let response = transport.send(message).await?;
        log::info!(
            "Change notification for {} accepted by {} ({})",
            url,
            self.config.smtp.host,
            response.code()
        );
        Ok(())
    }
}

fn parse_address(address: &str) -> Result<Address, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

fn credentials(smtp: &SmtpConfig) -> Option<Credentials> {
    let username = smtp.username.as_deref().filter(|u| !u.is_empty())?;
    Some(Credentials::new(
        username.to_string(),
        smtp.password.clone().unwrap_or_default(),
    ))
}

fn render_body(url: &str) -> String {
    let url = escape_html(url);
    format!("Website address: <a href=\"{url}\">{url}</a>\n")
}

/// Escape text for use in HTML content and double-quoted attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

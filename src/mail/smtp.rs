//! mail::smtp
//!
//! Production [`Mailer`] delivering over authenticated SMTP.
//!
//! # Design
//!
//! Each send opens a fresh implicit-TLS session to the configured
//! `host:port`, authenticates with the sender's credentials, delivers the
//! one message, and drops the connection. A post-receive hook sends a
//! handful of messages at most, so connection reuse buys nothing.
//!
//! Headers are `From` (the configured sender), `Reply-To` (the committer
//! the message is about), `To` (all recipients on one header), and
//! `Subject`; the body is plain text.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};

use super::traits::{MailError, Mailer};
use crate::core::compose::OutgoingMessage;
use crate::core::config::Config;

/// Mailer backed by an authenticated implicit-TLS SMTP session.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    sender: String,
    sender_password: String,
    recipients: Vec<String>,
}

impl SmtpMailer {
    /// Build a mailer from the loaded hook configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender: config.sender.clone(),
            sender_password: config.sender_password.clone(),
            recipients: config.recipients.clone(),
        }
    }

    /// Parse one address, mapping the failure to [`MailError::Address`].
    fn mailbox(address: &str) -> Result<Mailbox, MailError> {
        address.parse().map_err(|e: lettre::address::AddressError| {
            MailError::Address {
                address: address.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Assemble the RFC 5322 message.
    fn build(&self, message: &OutgoingMessage) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(Self::mailbox(&self.sender)?)
            .reply_to(Self::mailbox(&message.reply_to)?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.recipients {
            builder = builder.to(Self::mailbox(recipient)?);
        }
        builder
            .body(message.body.clone())
            .map_err(|e| MailError::Build {
                message: e.to_string(),
            })
    }

    /// Open the authenticated implicit-TLS transport.
    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let tls = TlsParameters::new(self.host.clone()).map_err(|e| MailError::Transport {
            message: e.to_string(),
        })?;
        Ok(SmtpTransport::builder_dangerous(&self.host)
            .port(self.port)
            .tls(Tls::Wrapper(tls))
            .credentials(Credentials::new(
                self.sender.clone(),
                self.sender_password.clone(),
            ))
            .build())
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<(), MailError> {
        // Nobody to notify: no message, no connection.
        if self.recipients.is_empty() {
            return Ok(());
        }

        let email = self.build(message)?;
        self.transport()?
            .send(&email)
            .map(|_| ())
            .map_err(|e| MailError::Transport {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(recipients: Vec<String>) -> SmtpMailer {
        SmtpMailer {
            host: "smtp.invalid".to_string(),
            port: 465,
            sender: "git@example.com".to_string(),
            sender_password: "hunter2".to_string(),
            recipients,
        }
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            subject: "new branch: (main)".to_string(),
            reply_to: "dev@example.com".to_string(),
            body: "body".to_string(),
        }
    }

    #[test]
    fn empty_recipients_is_a_no_op() {
        // `smtp.invalid` resolves nowhere; success proves no connection
        // was attempted.
        let mailer = mailer(vec![]);
        assert!(mailer.send(&message()).is_ok());
    }

    #[test]
    fn builds_headers_for_all_recipients() {
        let mailer = mailer(vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ]);
        let email = mailer.build(&message()).unwrap();
        let rendered = String::from_utf8(email.formatted()).unwrap();
        assert!(rendered.contains("From: git@example.com"));
        assert!(rendered.contains("Reply-To: dev@example.com"));
        assert!(rendered.contains("a@example.com"));
        assert!(rendered.contains("b@example.com"));
        assert!(rendered.contains("Subject: new branch: (main)"));
    }

    #[test]
    fn bad_recipient_address_is_an_address_error() {
        let mailer = mailer(vec!["not an address".to_string()]);
        let err = mailer.send(&message()).unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }
}

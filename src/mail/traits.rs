//! mail::traits
//!
//! Mailer trait definition.

use thiserror::Error;

use crate::core::compose::OutgoingMessage;

/// Errors from mail delivery.
#[derive(Debug, Error)]
pub enum MailError {
    /// A sender, recipient, or reply-to address could not be parsed.
    #[error("invalid mail address '{address}': {message}")]
    Address {
        /// The offending address
        address: String,
        /// Parser diagnostic
        message: String,
    },

    /// The message could not be assembled from its parts.
    #[error("failed to build message: {message}")]
    Build {
        /// Builder diagnostic
        message: String,
    },

    /// Connection, authentication, or delivery failed.
    #[error("smtp delivery failed: {message}")]
    Transport {
        /// Transport diagnostic
        message: String,
    },
}

/// Delivers one notification email.
///
/// Implementations hold the sender identity and recipient list; the caller
/// supplies only the per-update message. `send` blocks until the message is
/// accepted by the server (or fails), and MUST be a no-op when the
/// recipient list is empty.
pub trait Mailer {
    /// Deliver `message` to the configured recipients.
    fn send(&self, message: &OutgoingMessage) -> Result<(), MailError>;
}

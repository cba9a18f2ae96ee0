//! mail::mock
//!
//! Mock mailer for deterministic testing.
//!
//! # Design
//!
//! The mock records every accepted send in memory and can be configured to
//! fail a specific send, for exercising the abort-on-failure path of the
//! push processor.
//!
//! # Example
//!
//! ```
//! use refmail::core::compose::OutgoingMessage;
//! use refmail::mail::{Mailer, MockMailer};
//!
//! let mailer = MockMailer::new();
//! mailer.send(&OutgoingMessage {
//!     subject: "new branch: (main)".to_string(),
//!     reply_to: "dev@example.com".to_string(),
//!     body: "body".to_string(),
//! }).unwrap();
//!
//! assert_eq!(mailer.sent().len(), 1);
//! assert_eq!(mailer.sent()[0].message.subject, "new branch: (main)");
//! ```

use std::sync::{Arc, Mutex};

use super::traits::{MailError, Mailer};
use crate::core::compose::OutgoingMessage;

/// One recorded send.
#[derive(Debug, Clone)]
pub struct SentMail {
    /// The message as handed to `send`.
    pub message: OutgoingMessage,
}

/// Mock mailer for testing.
///
/// Cloning shares the recorded state, so a test can keep a handle while
/// the processor owns another.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    inner: Arc<Mutex<MockMailerInner>>,
}

#[derive(Debug, Default)]
struct MockMailerInner {
    /// Accepted sends, in call order.
    sent: Vec<SentMail>,
    /// Zero-based index of the send that should fail, if any.
    fail_on: Option<usize>,
    /// Sends attempted so far, including the failed one.
    attempts: usize,
}

impl MockMailer {
    /// Create a mock that accepts every send.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose `index`-th send (zero-based) fails with a
    /// transport error.
    pub fn failing_on(index: usize) -> Self {
        let mailer = Self::new();
        mailer.inner.lock().unwrap().fail_on = Some(index);
        mailer
    }

    /// All accepted sends, in call order.
    pub fn sent(&self) -> Vec<SentMail> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// Subjects of all accepted sends, in call order.
    pub fn subjects(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|mail| mail.message.subject)
            .collect()
    }
}

impl Mailer for MockMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<(), MailError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.attempts;
        inner.attempts += 1;
        if inner.fail_on == Some(attempt) {
            return Err(MailError::Transport {
                message: "mock transport failure".to_string(),
            });
        }
        inner.sent.push(SentMail {
            message: message.clone(),
        });
        Ok(())
    }
}

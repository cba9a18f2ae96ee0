//! mail
//!
//! Mail transport abstraction and implementations.
//!
//! # Architecture
//!
//! This module is the only doorway to mail delivery. The [`Mailer`] trait
//! carries one operation, `send`; the production [`SmtpMailer`] delivers
//! over an authenticated implicit-TLS SMTP session via `lettre`, and
//! [`MockMailer`] records sends in memory for tests.
//!
//! An empty recipient list makes `send` a no-op in every implementation:
//! no connection is opened, no message is built.

pub mod mock;
pub mod smtp;
pub mod traits;

pub use mock::{MockMailer, SentMail};
pub use smtp::SmtpMailer;
pub use traits::{MailError, Mailer};

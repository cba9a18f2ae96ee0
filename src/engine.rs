//! engine
//!
//! Push processing: the orchestration loop of the hook.
//!
//! # Overview
//!
//! [`process_push`] walks the update records exactly as git reported them:
//! parse the line, classify the update, compose the notification, hand it
//! to the mail transport. One record at a time, in input order, no
//! reordering and no parallel delivery.
//!
//! # Failure semantics
//!
//! The first failing record aborts the run. Records processed before it
//! have already had mail sent and stay sent; records after it are never
//! reached. There is no per-record isolation and no retry; the caller logs
//! the error and exits.

use thiserror::Error;

use crate::core::classify::{classify_update, ClassifyError, RefDescriptor, UpdateCase};
use crate::core::compose::Composer;
use crate::core::config::Config;
use crate::core::types::{TypeError, UpdateRecord};
use crate::git::{GitError, Repository};
use crate::mail::{MailError, Mailer};

/// Errors from push processing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An input line did not parse as an update record.
    #[error("invalid update on input line {line}: {source}")]
    Input {
        /// 1-based line number on stdin
        line: usize,
        /// The parse failure
        source: TypeError,
    },

    /// An update could not be classified.
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// A metadata query during composition failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Mail delivery failed.
    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Process one push: every input line, in order.
///
/// `input` is the hook's verbatim stdin, one `<old> <new> <refname>`
/// triple per line. Each branch or tag case ends in exactly one
/// [`Mailer::send`] call; unknown ref namespaces produce no action.
///
/// Returns the number of notifications handed to the mailer.
///
/// # Errors
///
/// The first malformed line, failed query, disallowed update, or delivery
/// failure aborts the run; see [`EngineError`].
pub fn process_push(
    repo: &dyn Repository,
    mailer: &dyn Mailer,
    config: &Config,
    input: &str,
) -> Result<usize, EngineError> {
    let composer = Composer::new(repo, &config.mail_prefix);
    let mut notified = 0;

    for (index, line) in input.lines().enumerate() {
        let record = UpdateRecord::parse(line).map_err(|source| EngineError::Input {
            line: index + 1,
            source,
        })?;
        if process_record(repo, mailer, &composer, &record)? {
            notified += 1;
        }
    }

    Ok(notified)
}

/// Handle one record; true if a notification was sent.
fn process_record(
    repo: &dyn Repository,
    mailer: &dyn Mailer,
    composer: &Composer<'_>,
    record: &UpdateRecord,
) -> Result<bool, EngineError> {
    let descriptor = RefDescriptor::classify(&record.ref_name);
    let name = descriptor.short_name.as_str();

    let message = match classify_update(repo, &descriptor, record)? {
        UpdateCase::BranchCreated => composer.branch_created(&record.new, name)?,
        UpdateCase::BranchDeleted => composer.branch_deleted(&record.old, name)?,
        UpdateCase::BranchFastForwarded { commits } => {
            composer.fast_forwarded(&record.old, &record.new, name, commits)?
        }
        UpdateCase::BranchReset => composer.branch_reset(&record.new, name)?,
        UpdateCase::BranchRewrittenUnrelated => composer.branch_rewritten(&record.new, name)?,
        UpdateCase::TagCreated => composer.tag_created(&record.new, name)?,
        UpdateCase::TagDeleted => composer.tag_deleted(&record.old, name)?,
        UpdateCase::Ignored => return Ok(false),
    };

    mailer.send(&message)?;
    Ok(true)
}

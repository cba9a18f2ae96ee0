//! git::traits
//!
//! Repository trait definition for the git metadata queries the hook needs.
//!
//! # Design
//!
//! The `Repository` trait is the **single doorway** to git. Everything the
//! hook learns about the pushed repository flows through these six queries,
//! which return structured results and normalize failures into typed error
//! categories. No other module invokes git directly.
//!
//! Keeping the surface this small is what makes the decision logic testable:
//! the production implementation ([`crate::git::GitCli`]) shells out to the
//! git binary, while [`crate::git::MockRepository`] answers the same queries
//! from canned in-memory data.
//!
//! # Example
//!
//! ```ignore
//! use refmail::git::Repository;
//!
//! fn describe(repo: &dyn Repository, oid: &Oid) -> Result<String, GitError> {
//!     repo.format_show(oid.as_str(), "%h %s")
//! }
//! ```

use thiserror::Error;

use crate::core::types::{Oid, TypeError};

/// Errors from git queries.
///
/// These error types cover the failure categories the hook needs to handle
/// distinctly. The ancestry variants are split out because the push
/// processor treats them as fatal for the whole run.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git binary could not be started.
    #[error("failed to invoke git {command}: {source}")]
    Spawn {
        /// The subcommand and arguments that were attempted
        command: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("git {command} failed ({status}): {stderr}")]
    CommandFailed {
        /// The subcommand and arguments that were run
        command: String,
        /// The exit status, as reported by the OS
        status: String,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// A git command produced output that is not valid UTF-8.
    #[error("git {command} produced non-UTF-8 output")]
    NonUtf8 {
        /// The subcommand and arguments that were run
        command: String,
    },

    /// The ancestry check did not finish within its bounded wait.
    ///
    /// A post-receive hook must not hang the server side of a push, so the
    /// ancestry subprocess is given a deadline. Expiry is an error, never
    /// a "not an ancestor" answer.
    #[error("ancestry check did not finish within {timeout_ms}ms")]
    AncestryTimeout {
        /// The bound that expired, in milliseconds
        timeout_ms: u64,
    },

    /// The ancestry check exited with a status that means neither
    /// "yes" nor "no".
    #[error("ancestry check exited with unexpected status: {status}")]
    AncestryStatus {
        /// The exit status, as reported by the OS
        status: String,
    },

    /// A git command succeeded but its output could not be interpreted.
    #[error("unexpected output from git {command}: {message}")]
    UnexpectedOutput {
        /// The subcommand and arguments that were run
        command: String,
        /// Description of the problem
        message: String,
    },

    /// Output failed strong-type validation.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// The git metadata queries the hook runs against the pushed repository.
///
/// All methods are blocking; each call crosses a process boundary in the
/// production implementation. `rev` parameters accept any commit-like
/// revision expression git understands (an OID, or e.g. `<oid>^{commit}`
/// to peel a tag), while range and ancestry queries take validated OIDs.
pub trait Repository {
    /// Look up a configuration value by key.
    ///
    /// Returns `Ok(None)` when the key is unset. Only genuine lookup
    /// failures are errors.
    fn config_get(&self, key: &str) -> Result<Option<String>, GitError>;

    /// Full `git show` output for a revision.
    ///
    /// For an annotated tag this is the tag text followed by the commit
    /// it points to; for a lightweight tag or commit it is the commit
    /// itself.
    fn show(&self, rev: &str) -> Result<String, GitError>;

    /// Metadata of a single revision rendered through a
    /// `--pretty=format:` template.
    ///
    /// Callers interpolating untrusted text (ref names) into `format`
    /// must escape it with [`crate::core::compose::escape_format`] first.
    fn format_show(&self, rev: &str, format: &str) -> Result<String, GitError>;

    /// Pretty one-entry-per-commit log of the range `old..new`.
    fn rev_list_range(&self, old: &Oid, new: &Oid) -> Result<String, GitError>;

    /// Check if `ancestor` is an ancestor of `descendant`.
    ///
    /// Returns true if ancestor == descendant (a commit is its own
    /// ancestor). The check runs under a bounded wait; see
    /// [`GitError::AncestryTimeout`].
    fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError>;

    /// Number of commits reachable from `new` but not from `old`
    /// (the right-open range `old..new`).
    fn count_in_range(&self, old: &Oid, new: &Oid) -> Result<usize, GitError>;
}

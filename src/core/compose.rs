//! core::compose
//!
//! Composition of notification emails, one rule per [`UpdateCase`].
//!
//! # Overview
//!
//! The composer turns a classified ref update into an [`OutgoingMessage`]:
//! a subject, a reply-to address, and a plain-text body. Commit metadata is
//! pulled through the [`Repository`] queries; the composer itself holds no
//! state beyond the configured subject prefix.
//!
//! Subjects always carry the configured prefix. The reply-to address is the
//! committer email of the most relevant commit: the new tip for creations
//! and rewrites, the old tip for branch deletions, the tag's target commit
//! for tag events.
//!
//! # Format escaping
//!
//! Branch and tag names chosen by the operator are interpolated into
//! `--pretty=format:` templates. A literal `%` in such a name would be read
//! by git as a format directive, so names pass through [`escape_format`]
//! first.

use chrono::Local;

use crate::core::types::Oid;
use crate::git::{GitError, Repository};

/// One notification email, ready for the mail transport.
///
/// Constructed per update record, consumed once by
/// [`crate::mail::Mailer::send`], then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Subject line, including the configured prefix.
    pub subject: String,
    /// Reply-To address, a committer email.
    pub reply_to: String,
    /// Plain-text body.
    pub body: String,
}

/// Escape literal `%` characters for use inside a `--pretty=format:`
/// template.
///
/// # Example
///
/// ```
/// use refmail::core::compose::escape_format;
///
/// assert_eq!(escape_format("release-50%"), "release-50%%");
/// assert_eq!(escape_format("plain"), "plain");
/// ```
pub fn escape_format(text: &str) -> String {
    text.replace('%', "%%")
}

/// Composes one [`OutgoingMessage`] per update case.
///
/// # Example
///
/// ```
/// use refmail::core::compose::Composer;
/// use refmail::core::types::Oid;
/// use refmail::git::{MockCommit, MockRepository};
///
/// let tip = Oid::new("1111111111111111111111111111111111111111").unwrap();
/// let mut repo = MockRepository::new();
/// repo.add_commit(&tip, &[], MockCommit::new("initial commit"));
///
/// let composer = Composer::new(&repo, "[site] ");
/// let message = composer.branch_created(&tip, "main").unwrap();
/// assert_eq!(
///     message.subject,
///     "[site] new branch: (main) at commit 1111111: initial commit"
/// );
/// ```
pub struct Composer<'a> {
    repo: &'a dyn Repository,
    prefix: &'a str,
}

impl<'a> Composer<'a> {
    /// Create a composer with the given subject prefix.
    ///
    /// The prefix is used verbatim; normalization (trailing space) is the
    /// configuration loader's job.
    pub fn new(repo: &'a dyn Repository, prefix: &'a str) -> Self {
        Self { repo, prefix }
    }

    /// Subject line of a commit (`%s`).
    fn subject_of(&self, rev: &str) -> Result<String, GitError> {
        self.repo.format_show(rev, "%s")
    }

    /// Committer email of a commit (`%ce`).
    fn committer_email(&self, rev: &str) -> Result<String, GitError> {
        self.repo.format_show(rev, "%ce")
    }

    /// Peel a tag object to the commit it points at.
    fn tag_target(&self, tag: &Oid) -> Result<Oid, GitError> {
        let full = self.repo.format_show(&format!("{tag}^{{commit}}"), "%H")?;
        Ok(Oid::new(full.trim())?)
    }

    /// A new branch appeared at `new`.
    pub fn branch_created(&self, new: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let subject = format!(
            "{}new branch: ({}) at commit {}: {}",
            self.prefix,
            name,
            new.short(7),
            self.subject_of(new.as_str())?
        );
        let template = format!(
            "Committer: %cn <%ce>\n\
             Date: %cD\n\
             New branch: {}\n\
             Commit: %H\n\
             Subject: %s\n\
             Notes:\n\
             %N",
            escape_format(name)
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(new.as_str())?,
            body: self.repo.format_show(new.as_str(), &template)?,
        })
    }

    /// A branch that pointed at `old` was deleted.
    pub fn branch_deleted(&self, old: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let subject = format!("{}delete branch: ({})", self.prefix, name);
        let body = format!(
            "Date: {}\n\
             Deleted branch: {}",
            Local::now().to_rfc2822(),
            name
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(old.as_str())?,
            body,
        })
    }

    /// New commits were appended: the range `old..new` holds `commits`
    /// commits, at least one.
    pub fn fast_forwarded(
        &self,
        old: &Oid,
        new: &Oid,
        name: &str,
        commits: usize,
    ) -> Result<OutgoingMessage, GitError> {
        let subject = if commits == 1 {
            format!(
                "{}({}) new commit {}: {}",
                self.prefix,
                name,
                new.short(7),
                self.subject_of(new.as_str())?
            )
        } else {
            format!(
                "{}({}) {} new commits {}: {}",
                self.prefix,
                name,
                commits,
                new.short(7),
                self.subject_of(new.as_str())?
            )
        };
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(new.as_str())?,
            body: self.repo.rev_list_range(old, new)?,
        })
    }

    /// The branch was forcibly moved back to its own ancestor `new`.
    pub fn branch_reset(&self, new: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let subject = format!(
            "{}({}) forced reset to commit {}: {}",
            self.prefix,
            name,
            new.short(7),
            self.subject_of(new.as_str())?
        );
        let template = format!(
            "Committer: %cn <%ce>\n\
             Date: %cD\n\
             Branch: {}\n\
             Reset to commit: %H\n\
             Subject: %s\n\
             Notes:\n\
             %N",
            escape_format(name)
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(new.as_str())?,
            body: self.repo.format_show(new.as_str(), &template)?,
        })
    }

    /// The branch was rewritten to history unrelated to its previous tip.
    pub fn branch_rewritten(&self, new: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let subject = format!(
            "{}({}) forced rewrite to commit {}: {}",
            self.prefix,
            name,
            new.short(7),
            self.subject_of(new.as_str())?
        );
        let template = format!(
            "Committer: %cn <%ce>\n\
             Date: %cD\n\
             Branch: {}\n\
             Most recent commit: %H\n\
             Subject: %s\n\
             Notes:\n\
             %N",
            escape_format(name)
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(new.as_str())?,
            body: self.repo.format_show(new.as_str(), &template)?,
        })
    }

    /// A new tag appeared at `tag` (the tag object itself for an annotated
    /// tag, the commit for a lightweight one).
    pub fn tag_created(&self, tag: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let target = self.tag_target(tag)?;
        let subject = format!(
            "{}new tag: ({}) at commit {}: {}",
            self.prefix,
            name,
            target.short(7),
            self.subject_of(target.as_str())?
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(target.as_str())?,
            body: self.repo.show(tag.as_str())?,
        })
    }

    /// A tag that pointed at `tag` was deleted.
    pub fn tag_deleted(&self, tag: &Oid, name: &str) -> Result<OutgoingMessage, GitError> {
        let target = self.tag_target(tag)?;
        let subject = format!("{}delete tag: ({})", self.prefix, name);
        let body = format!(
            "Date: {}\n\
             Deleted tag: {}",
            Local::now().to_rfc2822(),
            name
        );
        Ok(OutgoingMessage {
            subject,
            reply_to: self.committer_email(target.as_str())?,
            body,
        })
    }
}

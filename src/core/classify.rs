//! core::classify
//!
//! Classification of ref updates into notification cases.
//!
//! # Overview
//!
//! Every line on the hook's stdin describes one updated ref. Classification
//! maps that update to exactly one [`UpdateCase`], which in turn selects a
//! composition rule in [`crate::core::compose`]. The case is a pure function
//! of (old id, new id, ref kind, ancestry relation between old and new).
//!
//! # Decision table
//!
//! | Kind    | old is zero | new is zero | Ancestry            | Case                     |
//! |---------|-------------|-------------|---------------------|--------------------------|
//! | Branch  | yes         | no          | -                   | `BranchCreated`          |
//! | Branch  | no          | yes         | -                   | `BranchDeleted`          |
//! | Branch  | no          | no          | old ancestor of new | `BranchFastForwarded`    |
//! | Branch  | no          | no          | new ancestor of old | `BranchReset`            |
//! | Branch  | no          | no          | neither             | `BranchRewrittenUnrelated` |
//! | Tag     | yes         | no          | -                   | `TagCreated`             |
//! | Tag     | no          | yes         | -                   | `TagDeleted`             |
//! | Tag     | no          | no          | -                   | error: tag moved in place |
//! | Unknown | -           | -           | -                   | `Ignored`                |
//!
//! The fast-forward check runs first, so `old == new` degenerates to a
//! fast-forward spanning zero commits; that update is rejected rather than
//! announced as "0 new commits".

use thiserror::Error;

use crate::core::types::{Oid, UpdateRecord};
use crate::git::{GitError, Repository};

/// Errors from update classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// A branch was "updated" to the commit it already pointed at.
    ///
    /// Such an update carries zero new commits and produces no email.
    #[error("branch '{name}' updated with identical old and new ids ({oid})")]
    ZeroChange {
        /// Short name of the branch
        name: String,
        /// The id both sides of the update point at
        oid: Oid,
    },

    /// A tag ref was updated in place, neither created nor deleted.
    ///
    /// There is no composition rule for a moved tag. Surfacing the event as
    /// an error keeps it visible in the run log instead of dropping it.
    #[error("tag '{name}' moved in place ({old} -> {new}); in-place tag updates are not supported")]
    TagMoved {
        /// Short name of the tag
        name: String,
        /// The tag's previous target
        old: Oid,
        /// The tag's new target
        new: Oid,
    },

    /// An ancestry or range query failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// The kind of ref an update touched, by namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `refs/heads/*`
    Branch,
    /// `refs/tags/*`
    Tag,
    /// Any other namespace; produces no notification.
    Unknown,
}

/// A ref name reduced to what composition needs: its kind and short name.
///
/// # Example
///
/// ```
/// use refmail::core::classify::{RefDescriptor, RefKind};
///
/// let descriptor = RefDescriptor::classify("refs/heads/feature/login");
/// assert_eq!(descriptor.kind, RefKind::Branch);
/// assert_eq!(descriptor.short_name, "login");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefDescriptor {
    /// Namespace the ref lives in.
    pub kind: RefKind,
    /// The final `/`-separated segment of the ref name, regardless of kind.
    pub short_name: String,
}

impl RefDescriptor {
    /// Derive a descriptor from a full ref name.
    ///
    /// Pure string operation with no failure modes: the prefix selects the
    /// kind, the last path segment is the short name.
    pub fn classify(ref_name: &str) -> Self {
        let short_name = ref_name.rsplit('/').next().unwrap_or(ref_name).to_string();
        let kind = if ref_name.starts_with("refs/heads/") {
            RefKind::Branch
        } else if ref_name.starts_with("refs/tags/") {
            RefKind::Tag
        } else {
            RefKind::Unknown
        };
        Self { kind, short_name }
    }
}

/// What happened to a ref, as announced in the notification email.
///
/// Exactly one case applies per update record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCase {
    /// A branch ref appeared (old id is the zero sentinel).
    BranchCreated,
    /// A branch ref vanished (new id is the zero sentinel).
    BranchDeleted,
    /// New commits were appended to an existing branch.
    BranchFastForwarded {
        /// Number of commits in the range `old..new`; always at least 1.
        commits: usize,
    },
    /// The branch was moved back to one of its own ancestors.
    BranchReset,
    /// The branch now points at history unrelated to its previous tip,
    /// e.g. after a rebase or history edit.
    BranchRewrittenUnrelated,
    /// A tag ref appeared.
    TagCreated,
    /// A tag ref vanished.
    TagDeleted,
    /// The ref is outside `refs/heads/` and `refs/tags/`; no notification.
    Ignored,
}

/// Determine the single [`UpdateCase`] for one update record.
///
/// Branch updates with both ids present need ancestry queries against the
/// repository; every other case is decided from the record alone.
///
/// # Errors
///
/// - [`ClassifyError::ZeroChange`] when a branch update spans zero commits
/// - [`ClassifyError::TagMoved`] when a tag is updated in place
/// - [`ClassifyError::Git`] when an ancestry or count query fails
pub fn classify_update(
    repo: &dyn Repository,
    descriptor: &RefDescriptor,
    record: &UpdateRecord,
) -> Result<UpdateCase, ClassifyError> {
    match descriptor.kind {
        RefKind::Branch => {
            if record.old.is_zero() {
                Ok(UpdateCase::BranchCreated)
            } else if record.new.is_zero() {
                Ok(UpdateCase::BranchDeleted)
            } else {
                branch_relation(repo, descriptor, record)
            }
        }
        RefKind::Tag => {
            if record.old.is_zero() {
                Ok(UpdateCase::TagCreated)
            } else if record.new.is_zero() {
                Ok(UpdateCase::TagDeleted)
            } else {
                Err(ClassifyError::TagMoved {
                    name: descriptor.short_name.clone(),
                    old: record.old.clone(),
                    new: record.new.clone(),
                })
            }
        }
        RefKind::Unknown => Ok(UpdateCase::Ignored),
    }
}

/// Resolve the ancestry relation for a branch update with both ids present.
fn branch_relation(
    repo: &dyn Repository,
    descriptor: &RefDescriptor,
    record: &UpdateRecord,
) -> Result<UpdateCase, ClassifyError> {
    if repo.is_ancestor(&record.old, &record.new)? {
        let commits = repo.count_in_range(&record.old, &record.new)?;
        if commits == 0 {
            return Err(ClassifyError::ZeroChange {
                name: descriptor.short_name.clone(),
                oid: record.new.clone(),
            });
        }
        Ok(UpdateCase::BranchFastForwarded { commits })
    } else if repo.is_ancestor(&record.new, &record.old)? {
        Ok(UpdateCase::BranchReset)
    } else {
        Ok(UpdateCase::BranchRewrittenUnrelated)
    }
}

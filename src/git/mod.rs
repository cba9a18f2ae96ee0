//! git
//!
//! Single interface for all git metadata queries.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to git. Everything the hook learns
//! about the pushed repository flows through the [`Repository`] trait; no
//! other module invokes git directly.
//!
//! # Responsibilities
//!
//! - Configuration lookup (`git config --get`)
//! - Commit metadata rendering (`git show --pretty=format:`)
//! - Range logs and counts (`git rev-list`)
//! - Ancestry queries under a bounded wait (`git merge-base --is-ancestor`)
//!
//! # Implementations
//!
//! [`GitCli`] shells out to the git binary the way the hook's environment
//! expects; [`MockRepository`] answers the same queries from canned
//! in-memory data, which is what makes the decision logic testable without
//! a real repository.

mod mock;
mod subprocess;
mod traits;

pub use mock::{MockCommit, MockRepository};
pub use subprocess::GitCli;
pub use traits::{GitError, Repository};

//! git::mock
//!
//! Mock repository implementation for deterministic testing.
//!
//! # Design
//!
//! The mock answers the [`Repository`] queries from canned in-memory data:
//! a commit graph with per-commit metadata, tag objects with show text, and
//! a configuration map. It renders `--pretty=format:` templates itself
//! (including `%%` escaping), so composition rules can be exercised without
//! a real repository.
//!
//! # Example
//!
//! ```
//! use refmail::core::types::Oid;
//! use refmail::git::{MockCommit, MockRepository, Repository};
//!
//! let base = Oid::new("1111111111111111111111111111111111111111").unwrap();
//! let tip = Oid::new("2222222222222222222222222222222222222222").unwrap();
//!
//! let mut repo = MockRepository::new();
//! repo.add_commit(&base, &[], MockCommit::new("initial commit"));
//! repo.add_commit(&tip, &[&base], MockCommit::new("add feature"));
//!
//! assert!(repo.is_ancestor(&base, &tip).unwrap());
//! assert!(!repo.is_ancestor(&tip, &base).unwrap());
//! assert_eq!(repo.count_in_range(&base, &tip).unwrap(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use super::traits::{GitError, Repository};
use crate::core::types::Oid;

/// Canned metadata for one commit in the mock graph.
#[derive(Debug, Clone)]
pub struct MockCommit {
    /// Subject line (`%s`).
    pub subject: String,
    /// Committer name (`%cn`).
    pub committer_name: String,
    /// Committer email (`%ce`).
    pub committer_email: String,
    /// Committer date (`%cD`).
    pub committer_date: String,
    /// Notes (`%N`).
    pub notes: String,
}

impl MockCommit {
    /// Create a commit with the given subject and placeholder identity.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            committer_name: "Test Committer".to_string(),
            committer_email: "committer@example.com".to_string(),
            committer_date: "Mon, 2 Jan 2023 10:20:30 +0000".to_string(),
            notes: String::new(),
        }
    }

    /// Set the committer identity.
    pub fn by(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.committer_name = name.into();
        self.committer_email = email.into();
        self
    }
}

/// Mock repository for testing.
///
/// Build the graph with [`add_commit`](Self::add_commit) and
/// [`add_tag`](Self::add_tag), then hand out `&MockRepository` wherever a
/// [`Repository`] is expected.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    /// Commit metadata by full OID.
    commits: HashMap<String, MockCommit>,
    /// Parent OIDs by commit OID.
    parents: HashMap<String, Vec<String>>,
    /// Tag object OID to target commit OID.
    tags: HashMap<String, String>,
    /// Tag object OID to full `show` text.
    tag_text: HashMap<String, String>,
    /// Configuration map.
    config: HashMap<String, String>,
}

impl MockRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit with its parents and metadata.
    pub fn add_commit(&mut self, oid: &Oid, parents: &[&Oid], commit: MockCommit) {
        self.commits.insert(oid.as_str().to_string(), commit);
        self.parents.insert(
            oid.as_str().to_string(),
            parents.iter().map(|p| p.as_str().to_string()).collect(),
        );
    }

    /// Add an annotated tag object pointing at a commit.
    pub fn add_tag(&mut self, tag: &Oid, target: &Oid, show_text: impl Into<String>) {
        self.tags
            .insert(tag.as_str().to_string(), target.as_str().to_string());
        self.tag_text.insert(tag.as_str().to_string(), show_text.into());
    }

    /// Set a configuration value.
    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    /// Unset a configuration value.
    pub fn remove_config(&mut self, key: &str) {
        self.config.remove(key);
    }

    /// Resolve a revision expression to a commit OID.
    ///
    /// Understands a trailing `^{commit}` (peel a tag to its target) and
    /// plain OIDs, which is all the hook ever asks for.
    fn resolve(&self, rev: &str) -> Result<String, GitError> {
        let bare = rev.strip_suffix("^{commit}").unwrap_or(rev);
        let oid = match self.tags.get(bare) {
            Some(target) => target.clone(),
            None => bare.to_string(),
        };
        if self.commits.contains_key(&oid) {
            Ok(oid)
        } else {
            Err(bad_revision("show", rev))
        }
    }

    /// All commit OIDs reachable from `tip`, including `tip` itself.
    fn reachable(&self, tip: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut stack = vec![tip.to_string()];
        while let Some(oid) = stack.pop() {
            if !seen.insert(oid.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&oid) {
                stack.extend(parents.iter().cloned());
            }
        }
        seen
    }

    /// Render a `--pretty=format:` template from canned commit data.
    ///
    /// Supports the placeholders the hook uses (`%H`, `%h`, `%s`, `%cn`,
    /// `%ce`, `%cD`, `%N`) and the `%%` escape; anything else is passed
    /// through verbatim, like git does for unknown placeholders.
    fn render(&self, oid: &str, commit: &MockCommit, template: &str) -> String {
        let mut out = String::new();
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('H') => out.push_str(oid),
                Some('h') => out.push_str(&oid[..7.min(oid.len())]),
                Some('s') => out.push_str(&commit.subject),
                Some('N') => out.push_str(&commit.notes),
                Some('c') => match chars.next() {
                    Some('n') => out.push_str(&commit.committer_name),
                    Some('e') => out.push_str(&commit.committer_email),
                    Some('D') => out.push_str(&commit.committer_date),
                    other => {
                        out.push_str("%c");
                        if let Some(other) = other {
                            out.push(other);
                        }
                    }
                },
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        out
    }
}

/// Error shaped like git's own complaint about an unknown revision.
fn bad_revision(subcommand: &str, rev: &str) -> GitError {
    GitError::CommandFailed {
        command: format!("{subcommand} {rev}"),
        status: "exit status: 128".to_string(),
        stderr: format!("fatal: bad revision '{rev}'"),
    }
}

impl Repository for MockRepository {
    fn config_get(&self, key: &str) -> Result<Option<String>, GitError> {
        Ok(self.config.get(key).cloned())
    }

    fn show(&self, rev: &str) -> Result<String, GitError> {
        if let Some(text) = self.tag_text.get(rev) {
            return Ok(text.clone());
        }
        let oid = self.resolve(rev)?;
        let commit = &self.commits[&oid];
        Ok(self.render(&oid, commit, "commit %H\nAuthor: %cn <%ce>\nDate:   %cD\n\n    %s\n"))
    }

    fn format_show(&self, rev: &str, format: &str) -> Result<String, GitError> {
        let oid = self.resolve(rev)?;
        let commit = &self.commits[&oid];
        Ok(self.render(&oid, commit, format))
    }

    fn rev_list_range(&self, old: &Oid, new: &Oid) -> Result<String, GitError> {
        let excluded = self.reachable(old.as_str());
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![new.as_str().to_string()];
        while let Some(oid) = stack.pop() {
            if excluded.contains(&oid) || !seen.insert(oid.clone()) {
                continue;
            }
            let commit = self
                .commits
                .get(&oid)
                .ok_or_else(|| bad_revision("rev-list", &oid))?;
            entries.push(self.render(
                &oid,
                commit,
                "commit %H\nAuthor: %cn <%ce>\nDate:   %cD\n\n    %s\n",
            ));
            if let Some(parents) = self.parents.get(&oid) {
                stack.extend(parents.iter().cloned());
            }
        }
        Ok(entries.join("\n").trim_end_matches('\n').to_string())
    }

    fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if !self.commits.contains_key(ancestor.as_str())
            || !self.commits.contains_key(descendant.as_str())
        {
            return Err(GitError::AncestryStatus {
                status: "exit status: 128".to_string(),
            });
        }
        Ok(self.reachable(descendant.as_str()).contains(ancestor.as_str()))
    }

    fn count_in_range(&self, old: &Oid, new: &Oid) -> Result<usize, GitError> {
        let excluded = self.reachable(old.as_str());
        let count = self
            .reachable(new.as_str())
            .iter()
            .filter(|oid| !excluded.contains(*oid))
            .count();
        Ok(count)
    }
}

//! git::subprocess
//!
//! Production [`Repository`] implementation that shells out to the git
//! binary.
//!
//! # Design
//!
//! A post-receive hook is started by `git receive-pack` with `GIT_DIR`
//! already pointing at the pushed repository, so the git CLI sees the right
//! repository without any discovery. Shelling out also gives us the pieces
//! the hook's emails are made of for free: `--pretty=format:` rendering,
//! `rev-list --pretty` logs, and the `merge-base --is-ancestor` exit-status
//! protocol.
//!
//! The ancestry check is the one query run under a deadline: it is the only
//! git invocation whose cost grows with history shape, and a hook that
//! hangs would wedge the server side of the push.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::traits::{GitError, Repository};
use crate::core::types::Oid;

/// How long the ancestry subprocess may run before the whole run is aborted.
const ANCESTRY_WAIT: Duration = Duration::from_secs(1);

/// Poll interval while waiting on the ancestry subprocess.
const ANCESTRY_POLL: Duration = Duration::from_millis(10);

/// Git metadata provider backed by the git CLI.
///
/// # Example
///
/// ```no_run
/// use refmail::git::{GitCli, Repository};
///
/// let repo = GitCli::new();
/// let prefix = repo.config_get("hooks.emailprefix")?;
/// # Ok::<(), refmail::git::GitError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    /// Directory to run git in; inherits the hook's working directory
    /// when `None`.
    cwd: Option<PathBuf>,
}

impl GitCli {
    /// Create a provider running git in the current directory.
    pub fn new() -> Self {
        Self { cwd: None }
    }

    /// Create a provider running git in the given directory.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(path.into()),
        }
    }

    /// Build a git command with the configured working directory.
    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run a git command and return its stdout, requiring a zero exit.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        let output = self
            .command(args)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| GitError::NonUtf8 { command })
    }
}

/// Strip the single trailing newline git appends to plumbing output.
fn chomp(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

impl Repository for GitCli {
    fn config_get(&self, key: &str) -> Result<Option<String>, GitError> {
        let command = format!("config --get {key}");
        let output = self
            .command(&["config", "--get", key])
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8(output.stdout)
                    .map_err(|_| GitError::NonUtf8 { command })?;
                Ok(Some(chomp(value)))
            }
            // Exit status 1 means the key is unset, not a failure.
            Some(1) => Ok(None),
            _ => Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    fn show(&self, rev: &str) -> Result<String, GitError> {
        self.run(&["show", rev])
    }

    fn format_show(&self, rev: &str, format: &str) -> Result<String, GitError> {
        let pretty = format!("--pretty=format:{format}");
        self.run(&["show", &pretty, "-s", rev])
    }

    fn rev_list_range(&self, old: &Oid, new: &Oid) -> Result<String, GitError> {
        let range = format!("{old}..{new}");
        self.run(&["rev-list", "--pretty", &range]).map(chomp)
    }

    fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        let command = format!("merge-base --is-ancestor {ancestor} {descendant}");
        let mut child = self
            .command(&[
                "merge-base",
                "--is-ancestor",
                ancestor.as_str(),
                descendant.as_str(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        let deadline = Instant::now() + ANCESTRY_WAIT;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        // Reap the child so it does not outlive the hook.
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(GitError::AncestryTimeout {
                            timeout_ms: ANCESTRY_WAIT.as_millis() as u64,
                        });
                    }
                    std::thread::sleep(ANCESTRY_POLL);
                }
                Err(source) => return Err(GitError::Spawn { command, source }),
            }
        };

        // merge-base --is-ancestor answers through its exit status:
        // 0 means yes, 1 means no, anything else is a failure.
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::AncestryStatus {
                status: status.to_string(),
            }),
        }
    }

    fn count_in_range(&self, old: &Oid, new: &Oid) -> Result<usize, GitError> {
        let range = format!("{old}..{new}");
        let output = self.run(&["rev-list", "--count", &range])?;
        output
            .trim()
            .parse()
            .map_err(|_| GitError::UnexpectedOutput {
                command: format!("rev-list --count {range}"),
                message: format!("expected a commit count, got '{}'", output.trim()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chomp_strips_one_trailing_newline() {
        assert_eq!(chomp("value\n".to_string()), "value");
        assert_eq!(chomp("value\n\n".to_string()), "value\n");
        assert_eq!(chomp("value".to_string()), "value");
        assert_eq!(chomp(String::new()), "");
    }

    #[test]
    fn command_includes_cwd() {
        let repo = GitCli::at("/some/repo");
        assert_eq!(repo.cwd, Some(PathBuf::from("/some/repo")));

        let bare = GitCli::new();
        assert!(bare.cwd.is_none());
    }
}

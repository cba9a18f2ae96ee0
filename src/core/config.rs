//! core::config
//!
//! Typed hook configuration, loaded once per run.
//!
//! # Overview
//!
//! All settings live in the server repository's git configuration under
//! `hooks.*` and are read through [`Repository::config_get`]. The loader
//! resolves them into an immutable [`Config`] value that is passed by
//! reference into every component that needs it; nothing looks configuration
//! up ambiently after startup.
//!
//! # Required vs. optional
//!
//! The SMTP settings (`hooks.smtp-host`, `hooks.smtp-port`,
//! `hooks.smtp-sender`, `hooks.smtp-sender-password`) are required; a
//! missing or empty value aborts the run before any record is processed.
//! Everything else has a default.
//!
//! # Example
//!
//! ```
//! use refmail::core::config::{keys, Config};
//! use refmail::git::MockRepository;
//!
//! let mut repo = MockRepository::new();
//! repo.set_config(keys::SMTP_HOST, "mail.example.com");
//! repo.set_config(keys::SMTP_PORT, "465");
//! repo.set_config(keys::SMTP_SENDER, "git@example.com");
//! repo.set_config(keys::SMTP_SENDER_PASSWORD, "hunter2");
//! repo.set_config(keys::MAILING_LIST, "dev@example.com, ops@example.com");
//!
//! let config = Config::load(&repo).unwrap();
//! assert_eq!(config.smtp_port, 465);
//! assert_eq!(config.recipients.len(), 2);
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::git::{GitError, Repository};

/// The git config keys the hook reads, as set on the server repository.
pub mod keys {
    /// Recipient list, split on commas and/or whitespace.
    pub const MAILING_LIST: &str = "hooks.mailinglist";
    /// Subject prefix, normalized to end with one space if non-empty.
    pub const EMAIL_PREFIX: &str = "hooks.emailprefix";
    /// SMTP server host.
    pub const SMTP_HOST: &str = "hooks.smtp-host";
    /// SMTP server port.
    pub const SMTP_PORT: &str = "hooks.smtp-port";
    /// Sender address, also the SMTP login.
    pub const SMTP_SENDER: &str = "hooks.smtp-sender";
    /// SMTP login password.
    pub const SMTP_SENDER_PASSWORD: &str = "hooks.smtp-sender-password";
    /// Append-only run log path.
    pub const LOG_FILE: &str = "hooks.post-receive-logfile";
    /// Verbatim-input logging toggle.
    pub const DEBUG: &str = "hooks.debug";
}

/// Path the run log defaults to when `hooks.post-receive-logfile` is unset.
const NULL_DEVICE: &str = "/dev/null";

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is unset (or set to an empty string).
    #[error("required git config key '{key}' is not set")]
    MissingKey {
        /// The `hooks.*` key that was missing
        key: &'static str,
    },

    /// `hooks.smtp-port` is set but is not a port number.
    #[error("invalid smtp port '{value}'")]
    InvalidPort {
        /// The value as configured
        value: String,
    },

    /// The configuration lookup itself failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Immutable process-wide settings, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Subject prefix; empty, or ending in exactly one space.
    pub mail_prefix: String,
    /// Whether to log the verbatim input lines of each run.
    pub debug: bool,
    /// Append-only run log path.
    pub log_path: PathBuf,
    /// SMTP server host.
    pub smtp_host: String,
    /// SMTP server port (implicit TLS).
    pub smtp_port: u16,
    /// Sender address, also used as the SMTP login.
    pub sender: String,
    /// SMTP login password.
    pub sender_password: String,
    /// Notification recipients, in configured order. May be empty, in
    /// which case no mail is sent.
    pub recipients: Vec<String>,
}

impl Config {
    /// Load the hook configuration from the repository's git config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when a required SMTP setting is
    /// absent or empty, [`ConfigError::InvalidPort`] when the port does not
    /// parse, and [`ConfigError::Git`] when a lookup fails outright.
    pub fn load(repo: &dyn Repository) -> Result<Self, ConfigError> {
        let mail_prefix = normalize_prefix(optional(repo, keys::EMAIL_PREFIX)?);
        let debug = parse_bool(&optional(repo, keys::DEBUG)?);
        let log_path = log_path_from(optional(repo, keys::LOG_FILE)?);

        let smtp_host = required(repo, keys::SMTP_HOST)?;
        let port_value = required(repo, keys::SMTP_PORT)?;
        let smtp_port = port_value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort { value: port_value })?;
        let sender = required(repo, keys::SMTP_SENDER)?;
        let sender_password = required(repo, keys::SMTP_SENDER_PASSWORD)?;

        let recipients = split_recipients(&optional(repo, keys::MAILING_LIST)?);

        Ok(Self {
            mail_prefix,
            debug,
            log_path,
            smtp_host,
            smtp_port,
            sender,
            sender_password,
            recipients,
        })
    }

    /// Resolve the run log path alone.
    ///
    /// The log must be open before the rest of the configuration is loaded,
    /// so that a configuration failure still lands in the log. A failed
    /// lookup falls back to the null device; the failure itself resurfaces
    /// from [`Config::load`] moments later.
    pub fn resolve_log_path(repo: &dyn Repository) -> PathBuf {
        match repo.config_get(keys::LOG_FILE) {
            Ok(value) => log_path_from(value.unwrap_or_default()),
            Err(_) => PathBuf::from(NULL_DEVICE),
        }
    }
}

/// Look up an optional key; unset resolves to the empty string.
fn optional(repo: &dyn Repository, key: &'static str) -> Result<String, ConfigError> {
    Ok(repo.config_get(key)?.unwrap_or_default())
}

/// Look up a required key; unset and empty are both fatal.
fn required(repo: &dyn Repository, key: &'static str) -> Result<String, ConfigError> {
    match repo.config_get(key)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingKey { key }),
    }
}

/// Normalize the subject prefix to end with a space when non-empty.
///
/// A prefix already ending in a space is left unchanged, not doubled.
fn normalize_prefix(mut prefix: String) -> String {
    if !prefix.is_empty() && !prefix.ends_with(' ') {
        prefix.push(' ');
    }
    prefix
}

/// Parse the `hooks.debug` boolean.
///
/// A value is true iff its first character is not `f`, `F`, or `0`;
/// empty (or unset) is false.
fn parse_bool(value: &str) -> bool {
    match value.chars().next() {
        Some('f') | Some('F') | Some('0') | None => false,
        Some(_) => true,
    }
}

/// Turn the configured log path into a real path, defaulting to the null
/// device when unset.
fn log_path_from(value: String) -> PathBuf {
    if value.is_empty() {
        PathBuf::from(NULL_DEVICE)
    } else {
        PathBuf::from(value)
    }
}

/// Split the recipient list on commas and/or whitespace, discarding empty
/// tokens.
fn split_recipients(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    /// A repository carrying the four required SMTP settings.
    fn minimal_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.set_config(keys::SMTP_HOST, "mail.example.com");
        repo.set_config(keys::SMTP_PORT, "465");
        repo.set_config(keys::SMTP_SENDER, "git@example.com");
        repo.set_config(keys::SMTP_SENDER_PASSWORD, "hunter2");
        repo
    }

    #[test]
    fn loads_required_settings() {
        let config = Config::load(&minimal_repo()).unwrap();
        assert_eq!(config.smtp_host, "mail.example.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.sender, "git@example.com");
        assert_eq!(config.sender_password, "hunter2");
    }

    #[test]
    fn optional_settings_default() {
        let config = Config::load(&minimal_repo()).unwrap();
        assert_eq!(config.mail_prefix, "");
        assert!(!config.debug);
        assert_eq!(config.log_path, PathBuf::from("/dev/null"));
        assert!(config.recipients.is_empty());
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let mut repo = minimal_repo();
        repo.remove_config(keys::SMTP_HOST);
        let err = Config::load(&repo).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingKey {
                key: keys::SMTP_HOST
            }
        ));
    }

    #[test]
    fn empty_required_key_is_fatal() {
        let mut repo = minimal_repo();
        repo.set_config(keys::SMTP_SENDER, "");
        assert!(matches!(
            Config::load(&repo).unwrap_err(),
            ConfigError::MissingKey { .. }
        ));
    }

    #[test]
    fn bad_port_rejected() {
        let mut repo = minimal_repo();
        repo.set_config(keys::SMTP_PORT, "sixty-five");
        assert!(matches!(
            Config::load(&repo).unwrap_err(),
            ConfigError::InvalidPort { .. }
        ));
    }

    #[test]
    fn prefix_gains_trailing_space() {
        let mut repo = minimal_repo();
        repo.set_config(keys::EMAIL_PREFIX, "[proj]");
        let config = Config::load(&repo).unwrap();
        assert_eq!(config.mail_prefix, "[proj] ");
    }

    #[test]
    fn prefix_trailing_space_not_doubled() {
        let mut repo = minimal_repo();
        repo.set_config(keys::EMAIL_PREFIX, "[proj] ");
        let config = Config::load(&repo).unwrap();
        assert_eq!(config.mail_prefix, "[proj] ");
    }

    #[test]
    fn debug_first_character_rule() {
        assert!(!parse_bool(""));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("F"));
        assert!(!parse_bool("0"));
        assert!(parse_bool("true"));
        assert!(parse_bool("yes"));
        assert!(parse_bool("1"));
        // Only the first character is inspected.
        assert!(parse_bool("no"));
    }

    #[test]
    fn recipients_split_on_commas_and_whitespace() {
        assert_eq!(
            split_recipients("a@x.com, b@x.com  c@x.com,d@x.com"),
            vec!["a@x.com", "b@x.com", "c@x.com", "d@x.com"]
        );
        assert!(split_recipients("").is_empty());
        assert!(split_recipients(" , ,, ").is_empty());
    }

    #[test]
    fn recipients_preserve_order() {
        let mut repo = minimal_repo();
        repo.set_config(keys::MAILING_LIST, "z@x.com a@x.com m@x.com");
        let config = Config::load(&repo).unwrap();
        assert_eq!(config.recipients, vec!["z@x.com", "a@x.com", "m@x.com"]);
    }

    #[test]
    fn log_path_configured() {
        let mut repo = minimal_repo();
        repo.set_config(keys::LOG_FILE, "/var/log/refmail.log");
        let config = Config::load(&repo).unwrap();
        assert_eq!(config.log_path, PathBuf::from("/var/log/refmail.log"));
        assert_eq!(
            Config::resolve_log_path(&repo),
            PathBuf::from("/var/log/refmail.log")
        );
    }

    #[test]
    fn log_path_defaults_to_null_device() {
        let repo = minimal_repo();
        assert_eq!(Config::resolve_log_path(&repo), PathBuf::from("/dev/null"));
    }
}

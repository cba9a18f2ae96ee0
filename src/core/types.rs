//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`UpdateRecord`] - One ref update as reported on the hook's stdin
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use refmail::core::types::{Oid, UpdateRecord};
//!
//! // Valid constructions
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let record = UpdateRecord::parse(
//!     "0000000000000000000000000000000000000000 \
//!      abc123def4567890abc123def4567890abc12345 refs/heads/main",
//! )
//! .unwrap();
//! assert!(record.old.is_zero());
//!
//! // Invalid constructions fail at creation time
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(UpdateRecord::parse("only two fields").is_err());
//! ```

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid update line: {0}")]
    InvalidUpdateLine(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency. The all-zero OID is
/// git's sentinel for a ref that did not exist before the push (create)
/// or no longer exists after it (delete).
///
/// # Example
///
/// ```
/// use refmail::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
///
/// // Zero OID for null references
/// let zero = Oid::zero();
/// assert!(zero.is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid(String);

impl Oid {
    /// The zero OID (40 zeros for SHA-1).
    const ZERO_SHA1: &'static str = "0000000000000000000000000000000000000000";

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Create the zero/null OID (40 zeros).
    ///
    /// This represents a null reference in git: the before-image of a
    /// created ref, or the after-image of a deleted one.
    pub fn zero() -> Self {
        Self(Self::ZERO_SHA1.to_string())
    }

    /// Check if this is the zero/null OID.
    ///
    /// # Example
    ///
    /// ```
    /// use refmail::core::types::Oid;
    ///
    /// assert!(Oid::zero().is_zero());
    ///
    /// let non_zero = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert!(!non_zero.is_zero());
    /// ```
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    ///
    /// # Example
    ///
    /// ```
    /// use refmail::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(7), "abc123d");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ref update as reported on the post-receive hook's stdin.
///
/// Git writes one line per updated ref, in the order the refs were
/// updated: `<old-oid> <new-oid> <refname>`. Records must be processed
/// in that order.
///
/// # Example
///
/// ```
/// use refmail::core::types::UpdateRecord;
///
/// let record = UpdateRecord::parse(
///     "0000000000000000000000000000000000000000 \
///      abc123def4567890abc123def4567890abc12345 refs/heads/main",
/// )
/// .unwrap();
/// assert!(record.old.is_zero());
/// assert_eq!(record.ref_name, "refs/heads/main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    /// The ref's value before the push (zero OID if it did not exist).
    pub old: Oid,
    /// The ref's value after the push (zero OID if it was deleted).
    pub new: Oid,
    /// The full ref name, e.g. `refs/heads/main`.
    pub ref_name: String,
}

impl UpdateRecord {
    /// Parse one stdin line into an update record.
    ///
    /// The line must contain exactly three whitespace-separated fields.
    /// No other input format is accepted.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidUpdateLine` if the field count is wrong,
    /// or `TypeError::InvalidOid` if either object id fails validation.
    pub fn parse(line: &str) -> Result<Self, TypeError> {
        let mut fields = line.split_whitespace();
        let (old, new, ref_name) = match (fields.next(), fields.next(), fields.next()) {
            (Some(old), Some(new), Some(ref_name)) => (old, new, ref_name),
            _ => {
                return Err(TypeError::InvalidUpdateLine(format!(
                    "expected '<old> <new> <refname>', got '{line}'"
                )))
            }
        };
        if fields.next().is_some() {
            return Err(TypeError::InvalidUpdateLine(format!(
                "trailing fields after refname in '{line}'"
            )));
        }

        Ok(Self {
            old: Oid::new(old)?,
            new: Oid::new(new)?,
            ref_name: ref_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1() {
            assert!(Oid::new("abc123def4567890abc123def4567890abc12345").is_ok());
        }

        #[test]
        fn valid_sha256() {
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            assert_eq!(sha256.len(), 64);
            assert!(Oid::new(sha256).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn zero_oid() {
            let zero = Oid::zero();
            assert!(zero.is_zero());
            assert_eq!(zero.as_str().len(), 40);
            assert!(zero.as_str().chars().all(|c| c == '0'));
        }

        #[test]
        fn non_zero_is_not_zero() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert!(!oid.is_zero());
        }

        #[test]
        fn short_form() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(4), "abc1");
            assert_eq!(oid.short(100), oid.as_str()); // Exceeds length
        }

        #[test]
        fn invalid_length() {
            assert!(Oid::new("").is_err());
            assert!(Oid::new("tooshort").is_err());
            assert!(Oid::new("abc123").is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("xyz123def4567890abc123def4567890abc12345").is_err());
        }
    }

    mod update_record {
        use super::*;

        const OLD: &str = "abc123def4567890abc123def4567890abc12345";
        const NEW: &str = "def456abc7890123def456abc7890123def45678";

        #[test]
        fn parses_triple() {
            let record = UpdateRecord::parse(&format!("{OLD} {NEW} refs/heads/main")).unwrap();
            assert_eq!(record.old.as_str(), OLD);
            assert_eq!(record.new.as_str(), NEW);
            assert_eq!(record.ref_name, "refs/heads/main");
        }

        #[test]
        fn tolerates_extra_whitespace() {
            let record = UpdateRecord::parse(&format!("{OLD}   {NEW}\trefs/tags/v1.0")).unwrap();
            assert_eq!(record.ref_name, "refs/tags/v1.0");
        }

        #[test]
        fn missing_fields_rejected() {
            assert!(UpdateRecord::parse("").is_err());
            assert!(UpdateRecord::parse(OLD).is_err());
            assert!(UpdateRecord::parse(&format!("{OLD} {NEW}")).is_err());
        }

        #[test]
        fn trailing_fields_rejected() {
            let line = format!("{OLD} {NEW} refs/heads/main surprise");
            assert!(UpdateRecord::parse(&line).is_err());
        }

        #[test]
        fn bad_oid_rejected() {
            let line = format!("nothex {NEW} refs/heads/main");
            assert!(UpdateRecord::parse(&line).is_err());
        }
    }
}

//! runlog
//!
//! Append-only run log.
//!
//! # Overview
//!
//! The log file is opened once, in append mode, before anything else the
//! run does, and closed on every exit path when the [`RunLog`] is dropped.
//! It receives two kinds of entries, each introduced by a local timestamp
//! line:
//!
//! - the verbatim input lines of a run, when debug logging is enabled;
//! - the full diagnostic chain of a failed run, regardless of debug.
//!
//! Concurrent pushes append from independent processes; their entries may
//! interleave. That imprecision is tolerated rather than locked away.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

/// Append-only log sink for one hook run.
pub struct RunLog {
    out: Box<dyn Write>,
}

impl RunLog {
    /// Open the log at `path` for appending, creating it if needed.
    ///
    /// A path that cannot be opened degrades to a discarding sink: the
    /// hook must finish its run and exit cleanly even when its log is
    /// misconfigured.
    pub fn open(path: &Path) -> Self {
        let out: Box<dyn Write> = match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => Box::new(file),
            Err(_) => Box::new(io::sink()),
        };
        Self { out }
    }

    /// Record the verbatim input of a run (debug logging).
    pub fn record_input(&mut self, input: &str) -> io::Result<()> {
        self.stamp()?;
        self.out.write_all(input.as_bytes())?;
        if !input.is_empty() && !input.ends_with('\n') {
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    /// Record a failed run: timestamp plus the full error chain.
    pub fn record_failure(&mut self, error: &anyhow::Error) -> io::Result<()> {
        self.stamp()?;
        writeln!(self.out, "{error:?}")?;
        self.out.flush()
    }

    /// Write the timestamp line that introduces every entry.
    fn stamp(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog").finish_non_exhaustive()
    }
}

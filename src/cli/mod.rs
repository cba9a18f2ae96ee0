//! cli
//!
//! Entry layer for the hook binary.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Open the run log before anything else can fail
//! - Funnel every failure into the single log-and-exit behavior
//!
//! # Error boundary
//!
//! [`run`] is where the typed errors of the layers below are caught. A
//! failed run appends a timestamp and the full diagnostic chain to the run
//! log and returns normally: the git hook protocol treats mail delivery as
//! non-blocking to the push, so no error escapes the process boundary.

pub mod args;

pub use args::Cli;

use std::io::Read;

use anyhow::{Context, Result};

use crate::core::config::Config;
use crate::engine;
use crate::git::GitCli;
use crate::mail::SmtpMailer;
use crate::runlog::RunLog;

/// Run the hook.
///
/// This is the main entry point called from `main.rs`. Never returns an
/// error; failures end up in the run log.
pub fn run() {
    let cli = Cli::parse_args();
    let repo = match &cli.cwd {
        Some(path) => GitCli::at(path),
        None => GitCli::new(),
    };

    // The log path is the one setting read before the log exists; a
    // lookup failure degrades to the null device so the run can at least
    // finish cleanly.
    let mut log = RunLog::open(&Config::resolve_log_path(&repo));

    if let Err(error) = run_hook(&repo, &mut log) {
        let _ = log.record_failure(&error);
    }
}

/// Read stdin, load configuration, and process the push.
fn run_hook(repo: &GitCli, log: &mut RunLog) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read ref updates from stdin")?;

    let config = Config::load(repo).context("failed to load hook configuration")?;

    if config.debug {
        log.record_input(&input)
            .context("failed to write input to the run log")?;
    }

    let mailer = SmtpMailer::from_config(&config);
    engine::process_push(repo, &mailer, &config, &input)
        .context("failed to process the push")?;

    Ok(())
}

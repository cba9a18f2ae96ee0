//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! The hook takes no subcommands: `git receive-pack` invokes it with the
//! update records on stdin and the repository already selected through the
//! environment. `--cwd` exists for running the hook by hand against a
//! repository elsewhere.

use clap::Parser;
use std::path::PathBuf;

/// refmail - per-ref notification emails, run as a git post-receive hook
#[derive(Parser, Debug)]
#[command(name = "refmail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if refmail was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

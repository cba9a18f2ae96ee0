//! refmail binary entry point.
//!
//! All work, including the catch-everything error boundary, lives in
//! [`refmail::cli::run`]. The process exits cleanly regardless of outcome:
//! a notification failure must not block the push that triggered it.

fn main() {
    refmail::cli::run();
}

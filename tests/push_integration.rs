//! Integration tests for push processing.
//!
//! These tests drive `engine::process_push` end to end against the mock
//! repository and mock mailer, verifying the classification-to-email
//! pipeline for every update case.

use refmail::core::config::{keys, Config};
use refmail::core::types::Oid;
use refmail::engine::{process_push, EngineError};
use refmail::git::{MockCommit, MockRepository};
use refmail::mail::MockMailer;

/// Test fixture with a small forked history and a full hook configuration.
///
/// The commit graph is `a <- b <- c <- d` on the main line and `a <- x`
/// on a side line, so fast-forward, reset, and unrelated-rewrite updates
/// can all be expressed.
struct TestPush {
    repo: MockRepository,
}

impl TestPush {
    fn new() -> Self {
        let mut repo = MockRepository::new();
        repo.set_config(keys::SMTP_HOST, "mail.example.com");
        repo.set_config(keys::SMTP_PORT, "465");
        repo.set_config(keys::SMTP_SENDER, "git@example.com");
        repo.set_config(keys::SMTP_SENDER_PASSWORD, "hunter2");
        repo.set_config(keys::MAILING_LIST, "dev@example.com");

        repo.add_commit(
            &oid('a'),
            &[],
            MockCommit::new("initial commit").by("Ada", "ada@example.com"),
        );
        repo.add_commit(
            &oid('b'),
            &[&oid('a')],
            MockCommit::new("second commit").by("Brin", "brin@example.com"),
        );
        repo.add_commit(
            &oid('c'),
            &[&oid('b')],
            MockCommit::new("third commit").by("Cass", "cass@example.com"),
        );
        repo.add_commit(
            &oid('d'),
            &[&oid('c')],
            MockCommit::new("fourth commit").by("Drew", "drew@example.com"),
        );
        repo.add_commit(
            &oid('e'),
            &[&oid('a')],
            MockCommit::new("sidetracked commit").by("Eve", "eve@example.com"),
        );

        Self { repo }
    }

    fn set_config(&mut self, key: &str, value: &str) {
        self.repo.set_config(key, value);
    }

    fn add_tag(&mut self, tag: &Oid, target: &Oid, show_text: &str) {
        self.repo.add_tag(tag, target, show_text);
    }

    /// Process `input` and return the mailer alongside the result.
    fn process(&self, input: &str) -> (MockMailer, Result<usize, EngineError>) {
        let config = Config::load(&self.repo).unwrap();
        let mailer = MockMailer::new();
        let result = process_push(&self.repo, &mailer, &config, input);
        (mailer, result)
    }

    /// Process `input` with a mailer whose `index`-th send fails.
    fn process_with_failing_mailer(
        &self,
        input: &str,
        index: usize,
    ) -> (MockMailer, Result<usize, EngineError>) {
        let config = Config::load(&self.repo).unwrap();
        let mailer = MockMailer::failing_on(index);
        let result = process_push(&self.repo, &mailer, &config, input);
        (mailer, result)
    }
}

fn oid(fill: char) -> Oid {
    Oid::new(fill.to_string().repeat(40)).unwrap()
}

fn line(old: &Oid, new: &Oid, ref_name: &str) -> String {
    format!("{old} {new} {ref_name}\n")
}

#[test]
fn new_branch_notification() {
    let push = TestPush::new();
    let input = line(&Oid::zero(), &oid('b'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    assert!(message.subject.contains("new branch: (main)"));
    assert!(message.subject.contains("at commit bbbbbbb: second commit"));
    assert_eq!(message.reply_to, "brin@example.com");
    assert!(message.body.contains("New branch: main"));
}

#[test]
fn deleted_branch_notification() {
    let push = TestPush::new();
    let input = line(&oid('b'), &Oid::zero(), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(message.subject, "delete branch: (main)");
    assert_eq!(message.reply_to, "brin@example.com");
    assert!(message.body.contains("Deleted branch: main"));
}

#[test]
fn subject_carries_configured_prefix() {
    let mut push = TestPush::new();
    push.set_config(keys::EMAIL_PREFIX, "[proj]");
    let input = line(&oid('b'), &Oid::zero(), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);
    assert_eq!(mailer.sent()[0].message.subject, "[proj] delete branch: (main)");
}

#[test]
fn single_commit_fast_forward() {
    let push = TestPush::new();
    let input = line(&oid('b'), &oid('c'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(message.subject, "(main) new commit ccccccc: third commit");
    assert_eq!(message.reply_to, "cass@example.com");
    assert!(message.body.contains("third commit"));
    assert!(!message.body.contains("second commit"));
}

#[test]
fn three_commit_fast_forward() {
    let push = TestPush::new();
    let input = line(&oid('a'), &oid('d'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert!(message.subject.contains("3 new commits"));
    assert!(message.body.contains("second commit"));
    assert!(message.body.contains("third commit"));
    assert!(message.body.contains("fourth commit"));
    assert!(!message.body.contains("initial commit"));
}

#[test]
fn forced_reset_notification() {
    let push = TestPush::new();
    let input = line(&oid('d'), &oid('b'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(
        message.subject,
        "(main) forced reset to commit bbbbbbb: second commit"
    );
    assert!(message.body.contains("Reset to commit:"));
}

#[test]
fn forced_rewrite_notification() {
    let push = TestPush::new();
    let input = line(&oid('d'), &oid('e'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(
        message.subject,
        "(main) forced rewrite to commit eeeeeee: sidetracked commit"
    );
    assert!(message.body.contains("Most recent commit:"));
}

#[test]
fn zero_change_update_sends_nothing_and_fails() {
    let push = TestPush::new();
    let input = line(&oid('b'), &oid('b'), "refs/heads/main");

    let (mailer, result) = push.process(&input);
    assert!(matches!(result, Err(EngineError::Classify(_))));
    assert!(mailer.sent().is_empty());
}

#[test]
fn new_tag_notification() {
    let mut push = TestPush::new();
    let tag = oid('7');
    push.add_tag(&tag, &oid('c'), "tag v1.0\nTagger: Cass\n\nfirst release\n");
    let input = line(&Oid::zero(), &tag, "refs/tags/v1.0");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(
        message.subject,
        "new tag: (v1.0) at commit ccccccc: third commit"
    );
    assert_eq!(message.reply_to, "cass@example.com");
    assert_eq!(message.body, "tag v1.0\nTagger: Cass\n\nfirst release\n");
}

#[test]
fn deleted_tag_notification() {
    let mut push = TestPush::new();
    let tag = oid('7');
    push.add_tag(&tag, &oid('c'), "tag v1.0");
    let input = line(&tag, &Oid::zero(), "refs/tags/v1.0");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert_eq!(message.subject, "delete tag: (v1.0)");
    assert_eq!(message.reply_to, "cass@example.com");
    assert!(message.body.contains("Deleted tag: v1.0"));
}

#[test]
fn tag_moved_in_place_sends_nothing_and_fails() {
    let mut push = TestPush::new();
    let (tag_old, tag_new) = (oid('7'), oid('8'));
    push.add_tag(&tag_old, &oid('b'), "tag v1.0");
    push.add_tag(&tag_new, &oid('c'), "tag v1.0 again");
    let input = line(&tag_old, &tag_new, "refs/tags/v1.0");

    let (mailer, result) = push.process(&input);
    assert!(matches!(result, Err(EngineError::Classify(_))));
    assert!(mailer.sent().is_empty());
}

#[test]
fn unknown_namespace_produces_no_mail_and_no_error() {
    let push = TestPush::new();
    let input = line(&oid('a'), &oid('b'), "refs/notes/commits");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 0);
    assert!(mailer.sent().is_empty());
}

#[test]
fn records_processed_in_input_order() {
    let mut push = TestPush::new();
    let tag = oid('7');
    push.add_tag(&tag, &oid('c'), "tag v1.0");

    let input = [
        line(&oid('b'), &oid('c'), "refs/heads/main"),
        line(&Oid::zero(), &oid('e'), "refs/heads/experiment"),
        line(&Oid::zero(), &tag, "refs/tags/v1.0"),
    ]
    .concat();

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 3);

    let subjects = mailer.subjects();
    assert!(subjects[0].starts_with("(main) new commit"));
    assert!(subjects[1].starts_with("new branch: (experiment)"));
    assert!(subjects[2].starts_with("new tag: (v1.0)"));
}

#[test]
fn mail_failure_aborts_remaining_records() {
    let push = TestPush::new();
    let input = [
        line(&oid('b'), &oid('c'), "refs/heads/main"),
        line(&oid('c'), &oid('d'), "refs/heads/main"),
        line(&Oid::zero(), &oid('e'), "refs/heads/experiment"),
    ]
    .concat();

    let (mailer, result) = push.process_with_failing_mailer(&input, 1);
    assert!(matches!(result, Err(EngineError::Mail(_))));

    // The first record was delivered; the third was never reached.
    let subjects = mailer.subjects();
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].starts_with("(main) new commit"));
}

#[test]
fn percent_in_branch_name_stays_literal() {
    let push = TestPush::new();
    let input = line(&Oid::zero(), &oid('b'), "refs/heads/rollout-50%");

    let (mailer, result) = push.process(&input);
    assert_eq!(result.unwrap(), 1);

    let message = &mailer.sent()[0].message;
    assert!(message.subject.contains("(rollout-50%)"));
    assert!(message.body.contains("New branch: rollout-50%"));
    assert!(!message.body.contains("rollout-50%%"));
}

#[test]
fn ancestry_failure_aborts_the_run() {
    let push = TestPush::new();
    // An id the repository has never seen makes the ancestry query fail.
    let input = [
        line(&oid('b'), &oid('f'), "refs/heads/main"),
        line(&Oid::zero(), &oid('e'), "refs/heads/experiment"),
    ]
    .concat();

    let (mailer, result) = push.process(&input);
    assert!(result.is_err());
    assert!(mailer.sent().is_empty());
}

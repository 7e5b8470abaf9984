use super::*;

fn failed(stderr: &str) -> VcsError {
    VcsError::CommandFailed {
        command: "push".to_string(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

#[yare::parameterized(
    non_fast_forward = { "! [rejected] main -> main (non-fast-forward)" },
    fetch_first = { "Updates were rejected because the remote contains work that you do (fetch first)" },
    cannot_lock_ref = { "cannot lock ref 'refs/heads/main': is at abc but expected def" },
    remote_rejected = { "remote: error: remote rejected" },
    push_rejected = { "push rejected" },
    failed_to_push = { "failed to push some refs to 'origin'" },
    mixed_case = { "NON-FAST-FORWARD update was rejected" },
)]
fn classifies_retryable_push_errors(stderr: &str) {
    assert!(failed(stderr).is_retryable(), "expected retryable: {stderr}");
}

#[test]
fn classifies_fatal_errors_as_non_retryable() {
    assert!(!failed("fatal: repository not found").is_retryable());
    assert!(!failed("fatal: authentication failed").is_retryable());
}

#[test]
fn timeout_is_always_retryable() {
    assert!(VcsError::Timeout { command: "fetch".into(), secs: 60 }.is_retryable());
}

#[test]
fn io_and_utf8_errors_are_not_retryable() {
    assert!(!VcsError::Io {
        command: "status".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no git binary"),
    }
    .is_retryable());
    assert!(!VcsError::InvalidUtf8 { command: "log".into() }.is_retryable());
}

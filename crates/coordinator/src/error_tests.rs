use super::*;

fn lock_entry() -> LockEntry {
    LockEntry {
        wu_id: WorkUnitId::from_number(7),
        lane: "Ops".to_string(),
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        pid: 123,
        agent_session: None,
    }
}

#[test]
fn exit_codes_match_spec_table() {
    assert_eq!(
        CoordinatorError::Validation {
            path: "code_paths[2]".into(),
            message: "bad glob".into()
        }
        .exit_code(),
        2
    );
    assert_eq!(
        CoordinatorError::IllegalTransition {
            wu_id: WorkUnitId::from_number(1),
            from: Status::Done,
            to: Status::Done,
        }
        .exit_code(),
        2
    );
    assert_eq!(
        CoordinatorError::LaneBusy { holder: lock_entry() }.exit_code(),
        3
    );
    assert_eq!(
        CoordinatorError::CorruptionRepaired {
            lines_kept: 1,
            lines_removed: 1,
            backup_path: "x".into(),
        }
        .exit_code(),
        4
    );
    assert_eq!(CoordinatorError::Bug("oops".into()).exit_code(), 1);
}

#[test]
fn vcs_retryable_errors_propagate_through_is_retryable() {
    let err = CoordinatorError::Vcs(VcsError::Timeout {
        command: "push".into(),
        secs: 5,
    });
    assert!(err.is_retryable());

    let err = CoordinatorError::Vcs(VcsError::InvalidUtf8 {
        command: "log".into(),
    });
    assert!(!err.is_retryable());
}

#[test]
fn non_vcs_errors_are_never_retryable() {
    assert!(!CoordinatorError::Bug("x".into()).is_retryable());
}

#[test]
fn lane_busy_display_names_the_holder() {
    let err = CoordinatorError::LaneBusy { holder: lock_entry() };
    assert!(err.to_string().contains("WU-7"));
}

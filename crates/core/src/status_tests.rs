use super::*;

/// Exact transition table from spec §4.C, checked exhaustively.
#[test]
fn transition_table_matches_spec() {
    use Status::*;
    let legal: &[(Status, Status)] = &[
        (Ready, InProgress),
        (InProgress, Ready),
        (InProgress, Blocked),
        (InProgress, Waiting),
        (InProgress, Done),
        (Blocked, InProgress),
        (Blocked, Done),
        (Waiting, InProgress),
        (Waiting, Done),
    ];

    for &from in &Status::ALL {
        for &to in &Status::ALL {
            let expected = legal.contains(&(from, to));
            assert_eq!(
                from.can_transition_to(to),
                expected,
                "{from:?} -> {to:?} expected {expected}"
            );
        }
    }
}

#[test]
fn no_self_transitions_are_legal() {
    for &s in &Status::ALL {
        assert!(!s.can_transition_to(s));
    }
}

#[test]
fn done_is_terminal_and_has_no_outgoing_transitions() {
    assert!(Status::Done.is_terminal());
    for &to in &Status::ALL {
        assert!(!Status::Done.can_transition_to(to));
    }
}

#[test]
fn only_done_is_terminal() {
    for &s in &Status::ALL {
        if s != Status::Done {
            assert!(!s.is_terminal());
        }
    }
}

#[test]
fn display_matches_wire_format() {
    assert_eq!(Status::Ready.to_string(), "ready");
    assert_eq!(Status::InProgress.to_string(), "in_progress");
    assert_eq!(Status::Blocked.to_string(), "blocked");
    assert_eq!(Status::Waiting.to_string(), "waiting");
    assert_eq!(Status::Done.to_string(), "done");
}

#[test]
fn serde_uses_snake_case() {
    assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in_progress\"");
    let s: Status = serde_json::from_str("\"blocked\"").unwrap();
    assert_eq!(s, Status::Blocked);
}

use super::*;
use lumenflow_vcs::FakeVcs;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

#[tokio::test]
async fn next_id_is_one_when_everything_is_empty() {
    let vcs = FakeVcs::new();
    let dir = TempDir::new().unwrap();
    let id = next_wu_id(&vcs, "origin", "main", &dir.path().join("wus"), &dir.path().join("stamps"), "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(1));
}

#[tokio::test]
async fn next_id_scans_local_yaml_directory() {
    let vcs = FakeVcs::new();
    let dir = TempDir::new().unwrap();
    let wus = dir.path().join("wus");
    std::fs::create_dir_all(&wus).unwrap();
    std::fs::write(wus.join("WU-3.yaml"), "").unwrap();
    std::fs::write(wus.join("WU-7.yaml"), "").unwrap();

    let id = next_wu_id(&vcs, "origin", "main", &wus, &dir.path().join("stamps"), "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(8));
}

#[tokio::test]
async fn next_id_scans_local_stamps_directory() {
    let vcs = FakeVcs::new();
    let dir = TempDir::new().unwrap();
    let stamps = dir.path().join("stamps");
    std::fs::create_dir_all(&stamps).unwrap();
    std::fs::write(stamps.join("WU-12.done"), "").unwrap();

    let id = next_wu_id(&vcs, "origin", "main", &dir.path().join("wus"), &stamps, "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(13));
}

#[tokio::test]
async fn next_id_scans_remote_yaml_tree() {
    let vcs = FakeVcs::new();
    vcs.put_tree("origin/main", "docs/wus", vec!["WU-20.yaml".to_string()]);
    let dir = TempDir::new().unwrap();

    let id = next_wu_id(&vcs, "origin", "main", &dir.path().join("wus"), &dir.path().join("stamps"), "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(21));
}

#[tokio::test]
async fn next_id_scans_remote_event_log() {
    let vcs = FakeVcs::new();
    vcs.put_file(
        "origin/main",
        "state/wu-events.jsonl",
        "{\"wu_id\":\"WU-5\"}\n{\"wu_id\":\"WU-30\"}\n",
    );
    let dir = TempDir::new().unwrap();

    let id = next_wu_id(&vcs, "origin", "main", &dir.path().join("wus"), &dir.path().join("stamps"), "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(31));
}

#[tokio::test]
async fn next_id_falls_back_to_local_max_when_remote_fetch_fails() {
    let vcs = FakeVcs::new();
    vcs.queue_error(lumenflow_vcs::VcsError::Timeout {
        command: "fetch".into(),
        secs: 5,
    });
    let dir = TempDir::new().unwrap();
    let wus = dir.path().join("wus");
    std::fs::create_dir_all(&wus).unwrap();
    std::fs::write(wus.join("WU-2.yaml"), "").unwrap();

    let id = next_wu_id(&vcs, "origin", "main", &wus, &dir.path().join("stamps"), "docs/wus", "state/wu-events.jsonl").await;
    assert_eq!(id, WorkUnitId::from_number(3));
}

#[tokio::test]
async fn retry_on_push_collision_succeeds_on_first_try() {
    let id = retry_on_push_collision(
        || async { Ok(WorkUnitId::from_number(1)) },
        3,
        Duration::from_millis(1),
    )
    .await
    .unwrap();
    assert_eq!(id, WorkUnitId::from_number(1));
}

#[tokio::test]
async fn retry_on_push_collision_retries_retryable_errors_then_succeeds() {
    let attempts = AtomicU32::new(0);
    let id = retry_on_push_collision(
        || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err((
                        WorkUnitId::from_number(n as u64 + 1),
                        CoordinatorError::Vcs(lumenflow_vcs::VcsError::CommandFailed {
                            command: "push".into(),
                            code: Some(1),
                            stderr: "non-fast-forward".into(),
                        }),
                    ))
                } else {
                    Ok(WorkUnitId::from_number(9))
                }
            }
        },
        3,
        Duration::from_millis(1),
    )
    .await
    .unwrap();
    assert_eq!(id, WorkUnitId::from_number(9));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_on_push_collision_surfaces_non_retryable_errors_immediately() {
    let attempts = AtomicU32::new(0);
    let err = retry_on_push_collision(
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<WorkUnitId, _>((
                    WorkUnitId::from_number(1),
                    CoordinatorError::Bug("not a push collision".into()),
                ))
            }
        },
        3,
        Duration::from_millis(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoordinatorError::Bug(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_on_push_collision_exhausts_and_reports_last_attempted_id() {
    let err = retry_on_push_collision(
        || async {
            Err::<WorkUnitId, _>((
                WorkUnitId::from_number(42),
                CoordinatorError::Vcs(lumenflow_vcs::VcsError::CommandFailed {
                    command: "push".into(),
                    code: Some(1),
                    stderr: "remote rejected".into(),
                }),
            ))
        },
        2,
        Duration::from_millis(1),
    )
    .await
    .unwrap_err();

    match err {
        CoordinatorError::IdGenerationFailed { last_attempted, .. } => {
            assert_eq!(last_attempted, WorkUnitId::from_number(42));
        }
        other => panic!("expected IdGenerationFailed, got {other:?}"),
    }
}

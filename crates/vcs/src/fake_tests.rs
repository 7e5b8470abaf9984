use super::*;
use std::path::PathBuf;

#[tokio::test]
async fn records_calls_in_order() {
    let vcs = FakeVcs::new();
    vcs.create_branch("feature", Some("main")).await.unwrap();
    vcs.checkout("feature").await.unwrap();
    vcs.commit("wip").await.unwrap();

    let calls = vcs.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], VcsCall::CreateBranch { .. }));
    assert!(matches!(calls[1], VcsCall::Checkout { .. }));
    assert!(matches!(calls[2], VcsCall::Commit { .. }));
}

#[tokio::test]
async fn add_marks_dirty_and_commit_marks_clean() {
    let vcs = FakeVcs::new();
    assert!(vcs.is_clean().await.unwrap());
    vcs.add(&[PathBuf::from("a.txt")]).await.unwrap();
    assert!(!vcs.is_clean().await.unwrap());
    vcs.commit("msg").await.unwrap();
    assert!(vcs.is_clean().await.unwrap());
}

#[tokio::test]
async fn queued_error_fires_once_then_clears() {
    let vcs = FakeVcs::new();
    vcs.queue_error(VcsError::Timeout {
        command: "push".into(),
        secs: 5,
    });
    let err = vcs.push("origin", "main", false).await.unwrap_err();
    assert!(matches!(err, VcsError::Timeout { .. }));

    vcs.push("origin", "main", false).await.unwrap();
}

#[tokio::test]
async fn checkout_updates_current_branch() {
    let vcs = FakeVcs::new();
    vcs.create_branch("feature", None).await.unwrap();
    vcs.checkout("feature").await.unwrap();
    assert_eq!(vcs.current_branch().await.unwrap(), "feature");
}

#[tokio::test]
async fn branch_exists_reflects_creation_and_deletion() {
    let vcs = FakeVcs::new();
    assert!(!vcs.branch_exists("feature").await.unwrap());
    vcs.create_branch("feature", None).await.unwrap();
    assert!(vcs.branch_exists("feature").await.unwrap());
    vcs.delete_branch("feature", false).await.unwrap();
    assert!(!vcs.branch_exists("feature").await.unwrap());
}

#[tokio::test]
async fn worktree_add_then_remove_roundtrip() {
    let vcs = FakeVcs::new();
    let path = PathBuf::from("/tmp/scratch-1");
    vcs.worktree_add(&path, "scratch", None).await.unwrap();
    assert_eq!(vcs.worktree_list().await.unwrap().len(), 1);
    vcs.worktree_remove(&path, true).await.unwrap();
    assert!(vcs.worktree_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn merge_base_requires_explicit_setup() {
    let vcs = FakeVcs::new();
    assert!(vcs.merge_base("main", "feature").await.is_err());
    vcs.set_merge_base("abc123");
    assert_eq!(vcs.merge_base("main", "feature").await.unwrap(), "abc123");
}

#[tokio::test]
async fn show_file_and_list_tree_return_seeded_fixtures() {
    let vcs = FakeVcs::new();
    vcs.put_file("HEAD", "notes.md", "hello");
    vcs.put_tree("HEAD", "src", vec!["src/main.rs".to_string()]);

    assert_eq!(vcs.show_file_at_ref("HEAD", "notes.md").await.unwrap(), "hello");
    assert_eq!(
        vcs.list_tree_at_ref("HEAD", "src").await.unwrap(),
        vec!["src/main.rs".to_string()]
    );
    assert!(vcs.show_file_at_ref("HEAD", "missing.md").await.is_err());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The abstract VCS operations the coordinator requires (spec §4.B).

use crate::error::VcsError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One entry in `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: String,
}

/// Abstract version-control operations. Implementations must be cheap to
/// clone and safe to share across async tasks, matching the adapter
/// convention used elsewhere in this codebase (session/notify adapters).
#[async_trait]
pub trait VcsPort: Clone + Send + Sync + 'static {
    /// Returns an adapter bound to `dir` instead of this adapter's own
    /// working directory, so callers can run commands inside a scratch
    /// worktree without disturbing the caller's own checkout (spec §4.G
    /// step 2: "bind the VCS adapter to this worktree").
    fn scoped_to(&self, dir: &Path) -> Self;

    async fn current_branch(&self) -> Result<String, VcsError>;
    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError>;
    async fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool, VcsError>;
    async fn is_clean(&self) -> Result<bool, VcsError>;
    async fn fetch(&self, remote: Option<&str>, branch: Option<&str>) -> Result<(), VcsError>;
    async fn pull_rebase(&self, remote: &str, branch: &str) -> Result<(), VcsError>;
    async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError>;
    async fn commit(&self, message: &str) -> Result<(), VcsError>;
    async fn push(
        &self,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), VcsError>;
    async fn checkout(&self, branch: &str) -> Result<(), VcsError>;
    async fn create_branch(&self, name: &str, start: Option<&str>) -> Result<(), VcsError>;
    async fn delete_branch(&self, name: &str, force: bool) -> Result<(), VcsError>;
    async fn merge(&self, branch: &str, ff_only: bool) -> Result<(), VcsError>;
    async fn commit_hash(&self, rref: Option<&str>) -> Result<String, VcsError>;
    async fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError>;
    async fn worktree_add(
        &self,
        path: &Path,
        branch: &str,
        start: Option<&str>,
    ) -> Result<(), VcsError>;
    async fn worktree_remove(&self, path: &Path, force: bool) -> Result<(), VcsError>;
    async fn worktree_list(&self) -> Result<Vec<WorktreeEntry>, VcsError>;
    async fn raw(&self, args: &[String]) -> Result<String, VcsError>;
    async fn show_file_at_ref(&self, rref: &str, path: &str) -> Result<String, VcsError>;
    async fn list_tree_at_ref(&self, rref: &str, dir: &str) -> Result<Vec<String>, VcsError>;
}

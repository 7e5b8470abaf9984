// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake [`VcsPort`] for coordinator unit tests.

use crate::error::VcsError;
use crate::port::{VcsPort, WorktreeEntry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One recorded call against a [`FakeVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Fetch {
        remote: Option<String>,
        branch: Option<String>,
    },
    PullRebase { remote: String, branch: String },
    Add { paths: Vec<PathBuf> },
    Commit { message: String },
    Push {
        remote: String,
        branch: String,
        set_upstream: bool,
    },
    Checkout { branch: String },
    CreateBranch {
        name: String,
        start: Option<String>,
    },
    DeleteBranch { name: String, force: bool },
    Merge { branch: String, ff_only: bool },
    WorktreeAdd {
        path: PathBuf,
        branch: String,
        start: Option<String>,
    },
    WorktreeRemove { path: PathBuf, force: bool },
    Raw { args: Vec<String> },
}

struct FakeVcsState {
    calls: Vec<VcsCall>,
    current_branch: String,
    branches: HashMap<String, String>,
    remote_branches: HashMap<String, String>,
    clean: bool,
    commit_hashes: HashMap<String, String>,
    head_hash: String,
    worktrees: Vec<WorktreeEntry>,
    files: HashMap<(String, String), String>,
    trees: HashMap<(String, String), Vec<String>>,
    next_command_error: Option<VcsError>,
    merge_base: Option<String>,
}

/// A call-recording, in-memory [`VcsPort`] double.
///
/// State is intentionally shallow: it tracks just enough (current branch,
/// known branch names, cleanliness, a queued failure) to drive coordinator
/// tests without shelling out to git.
#[derive(Clone)]
pub struct FakeVcs {
    inner: Arc<Mutex<FakeVcsState>>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeVcsState {
                calls: Vec::new(),
                current_branch: "main".to_string(),
                branches: HashMap::from([("main".to_string(), "0".repeat(40))]),
                remote_branches: HashMap::new(),
                clean: true,
                commit_hashes: HashMap::new(),
                head_hash: "0".repeat(40),
                worktrees: Vec::new(),
                files: HashMap::new(),
                trees: HashMap::new(),
                next_command_error: None,
                merge_base: None,
            })),
        }
    }
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_clean(&self, clean: bool) {
        self.inner.lock().clean = clean;
    }

    pub fn set_current_branch(&self, branch: &str) {
        self.inner.lock().current_branch = branch.to_string();
    }

    pub fn add_remote_branch(&self, remote: &str, name: &str) {
        self.inner
            .lock()
            .remote_branches
            .insert(format!("{remote}/{name}"), name.to_string());
    }

    pub fn set_head_hash(&self, hash: &str) {
        self.inner.lock().head_hash = hash.to_string();
    }

    pub fn set_merge_base(&self, hash: &str) {
        self.inner.lock().merge_base = Some(hash.to_string());
    }

    pub fn put_file(&self, rref: &str, path: &str, contents: &str) {
        self.inner
            .lock()
            .files
            .insert((rref.to_string(), path.to_string()), contents.to_string());
    }

    pub fn put_tree(&self, rref: &str, dir: &str, entries: Vec<String>) {
        self.inner
            .lock()
            .trees
            .insert((rref.to_string(), dir.to_string()), entries);
    }

    /// Cause the next mutating call to fail with `error` instead of succeeding.
    pub fn queue_error(&self, error: VcsError) {
        self.inner.lock().next_command_error = Some(error);
    }

    fn take_queued_error(&self) -> Option<VcsError> {
        self.inner.lock().next_command_error.take()
    }
}

#[async_trait]
impl VcsPort for FakeVcs {
    // The fake's state is shared and cwd-agnostic, so a scoped instance is
    // just a clone of the same shared state; tests that care which
    // directory an operation targets assert on the worktree path passed to
    // worktree_add/worktree_remove instead.
    fn scoped_to(&self, _dir: &Path) -> Self {
        self.clone()
    }

    async fn current_branch(&self) -> Result<String, VcsError> {
        Ok(self.inner.lock().current_branch.clone())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError> {
        Ok(self.inner.lock().branches.contains_key(name))
    }

    async fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool, VcsError> {
        Ok(self
            .inner
            .lock()
            .remote_branches
            .contains_key(&format!("{remote}/{name}")))
    }

    async fn is_clean(&self) -> Result<bool, VcsError> {
        Ok(self.inner.lock().clean)
    }

    async fn fetch(&self, remote: Option<&str>, branch: Option<&str>) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Fetch {
            remote: remote.map(str::to_string),
            branch: branch.map(str::to_string),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        Ok(())
    }

    async fn pull_rebase(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::PullRebase {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        Ok(())
    }

    async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Add {
            paths: paths.to_vec(),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        self.inner.lock().clean = false;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Commit {
            message: message.to_string(),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        self.inner.lock().clean = true;
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            set_upstream,
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Checkout {
            branch: branch.to_string(),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        self.inner.lock().current_branch = branch.to_string();
        Ok(())
    }

    async fn create_branch(&self, name: &str, start: Option<&str>) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::CreateBranch {
            name: name.to_string(),
            start: start.map(str::to_string),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        let mut inner = self.inner.lock();
        let hash = inner.head_hash.clone();
        inner.branches.insert(name.to_string(), hash);
        Ok(())
    }

    async fn delete_branch(&self, name: &str, force: bool) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::DeleteBranch {
            name: name.to_string(),
            force,
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        self.inner.lock().branches.remove(name);
        Ok(())
    }

    async fn merge(&self, branch: &str, ff_only: bool) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::Merge {
            branch: branch.to_string(),
            ff_only,
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        Ok(())
    }

    async fn commit_hash(&self, rref: Option<&str>) -> Result<String, VcsError> {
        let inner = self.inner.lock();
        match rref {
            None | Some("HEAD") => Ok(inner.head_hash.clone()),
            Some(other) => inner
                .branches
                .get(other)
                .or_else(|| inner.commit_hashes.get(other))
                .cloned()
                .ok_or_else(|| VcsError::CommandFailed {
                    command: format!("rev-parse {other}"),
                    code: Some(128),
                    stderr: format!("unknown revision: {other}"),
                }),
        }
    }

    async fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError> {
        let inner = self.inner.lock();
        inner.merge_base.clone().ok_or_else(|| VcsError::CommandFailed {
            command: format!("merge-base {a} {b}"),
            code: Some(1),
            stderr: "no merge base configured".to_string(),
        })
    }

    async fn worktree_add(
        &self,
        path: &Path,
        branch: &str,
        start: Option<&str>,
    ) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::WorktreeAdd {
            path: path.to_path_buf(),
            branch: branch.to_string(),
            start: start.map(str::to_string),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        let mut inner = self.inner.lock();
        let head = inner.head_hash.clone();
        inner.worktrees.push(WorktreeEntry {
            path: path.to_path_buf(),
            branch: Some(branch.to_string()),
            head,
        });
        Ok(())
    }

    async fn worktree_remove(&self, path: &Path, force: bool) -> Result<(), VcsError> {
        self.inner.lock().calls.push(VcsCall::WorktreeRemove {
            path: path.to_path_buf(),
            force,
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        self.inner.lock().worktrees.retain(|w| w.path != path);
        Ok(())
    }

    async fn worktree_list(&self) -> Result<Vec<WorktreeEntry>, VcsError> {
        Ok(self.inner.lock().worktrees.clone())
    }

    async fn raw(&self, args: &[String]) -> Result<String, VcsError> {
        self.inner.lock().calls.push(VcsCall::Raw {
            args: args.to_vec(),
        });
        if let Some(e) = self.take_queued_error() {
            return Err(e);
        }
        Ok(String::new())
    }

    async fn show_file_at_ref(&self, rref: &str, path: &str) -> Result<String, VcsError> {
        self.inner
            .lock()
            .files
            .get(&(rref.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| VcsError::CommandFailed {
                command: format!("show {rref}:{path}"),
                code: Some(128),
                stderr: "path does not exist".to_string(),
            })
    }

    async fn list_tree_at_ref(&self, rref: &str, dir: &str) -> Result<Vec<String>, VcsError> {
        Ok(self
            .inner
            .lock()
            .trees
            .get(&(rref.to_string(), dir.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

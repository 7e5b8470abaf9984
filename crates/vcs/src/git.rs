// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed [`VcsPort`] implementation that shells out to `git`.

use crate::error::VcsError;
use crate::port::{VcsPort, WorktreeEntry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for ordinary git commands (status, add, commit, checkout).
pub const GIT_DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for network operations (fetch, pull, push).
pub const GIT_NETWORK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for worktree add/remove.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Run `git <args>` in `dir` with a timeout, returning raw [`Output`].
async fn run(
    dir: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, VcsError> {
    let command_desc = format!("git {}", args.join(" "));
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(dir).args(args);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(VcsError::Io {
            command: command_desc,
            source,
        }),
        Err(_elapsed) => Err(VcsError::Timeout {
            command: command_desc,
            secs: timeout.as_secs(),
        }),
    }
}

/// Run `git <args>`, requiring a zero exit status, and return stdout as a
/// trimmed UTF-8 string.
async fn run_ok(dir: &Path, args: &[&str], timeout: Duration) -> Result<String, VcsError> {
    let output = run(dir, args, timeout).await?;
    let command_desc = format!("git {}", args.join(" "));
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: command_desc,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    String::from_utf8(output.stdout)
        .map(|s| s.trim().to_string())
        .map_err(|_| VcsError::InvalidUtf8 {
            command: command_desc,
        })
}

/// [`VcsPort`] implementation that invokes the system `git` binary against a
/// fixed working directory.
#[derive(Debug, Clone)]
pub struct GitVcs {
    work_dir: PathBuf,
}

impl GitVcs {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[async_trait]
impl VcsPort for GitVcs {
    fn scoped_to(&self, dir: &Path) -> Self {
        Self::new(dir)
    }

    async fn current_branch(&self) -> Result<String, VcsError> {
        run_ok(
            &self.work_dir,
            &["rev-parse", "--abbrev-ref", "HEAD"],
            GIT_DEFAULT_TIMEOUT,
        )
        .await
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError> {
        let refname = format!("refs/heads/{name}");
        let output = run(
            &self.work_dir,
            &["show-ref", "--verify", "--quiet", &refname],
            GIT_DEFAULT_TIMEOUT,
        )
        .await?;
        Ok(output.status.success())
    }

    async fn remote_branch_exists(&self, remote: &str, name: &str) -> Result<bool, VcsError> {
        let refname = format!("refs/remotes/{remote}/{name}");
        let output = run(
            &self.work_dir,
            &["show-ref", "--verify", "--quiet", &refname],
            GIT_DEFAULT_TIMEOUT,
        )
        .await?;
        Ok(output.status.success())
    }

    async fn is_clean(&self) -> Result<bool, VcsError> {
        let status = run_ok(
            &self.work_dir,
            &["status", "--porcelain"],
            GIT_DEFAULT_TIMEOUT,
        )
        .await?;
        Ok(status.is_empty())
    }

    async fn fetch(&self, remote: Option<&str>, branch: Option<&str>) -> Result<(), VcsError> {
        let mut args = vec!["fetch"];
        if let Some(remote) = remote {
            args.push(remote);
            if let Some(branch) = branch {
                args.push(branch);
            }
        }
        run_ok(&self.work_dir, &args, GIT_NETWORK_TIMEOUT).await?;
        Ok(())
    }

    async fn pull_rebase(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        run_ok(
            &self.work_dir,
            &["pull", "--rebase", remote, branch],
            GIT_NETWORK_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
        let mut args = vec!["add".to_string()];
        if paths.is_empty() {
            args.push(".".to_string());
        } else {
            for p in paths {
                args.push(p.to_string_lossy().into_owned());
            }
        }
        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ok(&self.work_dir, &args_ref, GIT_DEFAULT_TIMEOUT).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<(), VcsError> {
        run_ok(
            &self.work_dir,
            &["commit", "-m", message],
            GIT_DEFAULT_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), VcsError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.push(remote);
        args.push(branch);
        run_ok(&self.work_dir, &args, GIT_NETWORK_TIMEOUT).await?;
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        run_ok(&self.work_dir, &["checkout", branch], GIT_DEFAULT_TIMEOUT).await?;
        Ok(())
    }

    async fn create_branch(&self, name: &str, start: Option<&str>) -> Result<(), VcsError> {
        let mut args = vec!["branch", name];
        if let Some(start) = start {
            args.push(start);
        }
        run_ok(&self.work_dir, &args, GIT_DEFAULT_TIMEOUT).await?;
        Ok(())
    }

    async fn delete_branch(&self, name: &str, force: bool) -> Result<(), VcsError> {
        let flag = if force { "-D" } else { "-d" };
        run_ok(&self.work_dir, &["branch", flag, name], GIT_DEFAULT_TIMEOUT).await?;
        Ok(())
    }

    async fn merge(&self, branch: &str, ff_only: bool) -> Result<(), VcsError> {
        let mut args = vec!["merge"];
        if ff_only {
            args.push("--ff-only");
        }
        args.push(branch);
        run_ok(&self.work_dir, &args, GIT_DEFAULT_TIMEOUT).await?;
        Ok(())
    }

    async fn commit_hash(&self, rref: Option<&str>) -> Result<String, VcsError> {
        let rref = rref.unwrap_or("HEAD");
        run_ok(&self.work_dir, &["rev-parse", rref], GIT_DEFAULT_TIMEOUT).await
    }

    async fn merge_base(&self, a: &str, b: &str) -> Result<String, VcsError> {
        run_ok(&self.work_dir, &["merge-base", a, b], GIT_DEFAULT_TIMEOUT).await
    }

    async fn worktree_add(
        &self,
        path: &Path,
        branch: &str,
        start: Option<&str>,
    ) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        let mut args = vec!["worktree", "add", "-b", branch, &path_str];
        if let Some(start) = start {
            args.push(start);
        }
        run_ok(&self.work_dir, &args, GIT_WORKTREE_TIMEOUT).await?;
        Ok(())
    }

    async fn worktree_remove(&self, path: &Path, force: bool) -> Result<(), VcsError> {
        let path_str = path.to_string_lossy().into_owned();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        run_ok(&self.work_dir, &args, GIT_WORKTREE_TIMEOUT).await?;
        Ok(())
    }

    async fn worktree_list(&self) -> Result<Vec<WorktreeEntry>, VcsError> {
        let raw = run_ok(
            &self.work_dir,
            &["worktree", "list", "--porcelain"],
            GIT_WORKTREE_TIMEOUT,
        )
        .await?;
        Ok(parse_worktree_porcelain(&raw))
    }

    async fn raw(&self, args: &[String]) -> Result<String, VcsError> {
        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ok(&self.work_dir, &args_ref, GIT_DEFAULT_TIMEOUT).await
    }

    async fn show_file_at_ref(&self, rref: &str, path: &str) -> Result<String, VcsError> {
        let spec = format!("{rref}:{path}");
        run_ok(&self.work_dir, &["show", &spec], GIT_DEFAULT_TIMEOUT).await
    }

    async fn list_tree_at_ref(&self, rref: &str, dir: &str) -> Result<Vec<String>, VcsError> {
        let spec = format!("{rref}:{dir}");
        let raw = run_ok(
            &self.work_dir,
            &["ls-tree", "--name-only", "-r", &spec],
            GIT_DEFAULT_TIMEOUT,
        )
        .await?;
        Ok(raw.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }
}

/// Parse `git worktree list --porcelain` output into [`WorktreeEntry`] records.
fn parse_worktree_porcelain(raw: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut head: Option<String> = None;
    let mut branch: Option<String> = None;

    let flush = |path: &mut Option<PathBuf>, head: &mut Option<String>, branch: &mut Option<String>, out: &mut Vec<WorktreeEntry>| {
        if let (Some(p), Some(h)) = (path.take(), head.take()) {
            out.push(WorktreeEntry {
                path: p,
                branch: branch.take(),
                head: h,
            });
        } else {
            branch.take();
        }
    };

    for line in raw.lines() {
        if line.is_empty() {
            flush(&mut path, &mut head, &mut branch, &mut entries);
            continue;
        }
        if let Some(rest) = line.strip_prefix("worktree ") {
            path = Some(PathBuf::from(rest));
        } else if let Some(rest) = line.strip_prefix("HEAD ") {
            head = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("branch ") {
            branch = Some(
                rest.strip_prefix("refs/heads/")
                    .unwrap_or(rest)
                    .to_string(),
            );
        }
    }
    flush(&mut path, &mut head, &mut branch, &mut entries);
    entries
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

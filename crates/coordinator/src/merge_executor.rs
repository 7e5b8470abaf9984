// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scratch-worktree merge with rollback-on-failure (spec §4.G).

use lumenflow_core::{Clock, WorkUnitId};
use lumenflow_vcs::{VcsError, VcsPort};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::CoordinatorError;

/// Context handed to the `after_merge` closure in [`with_atomic_merge`].
pub struct MergeContext<'a, V: VcsPort> {
    pub worktree_path: &'a Path,
    pub vcs: &'a V,
}

pub struct AtomicMergeExecutor<V: VcsPort, C: Clock> {
    vcs: V,
    clock: C,
    scratch_root: PathBuf,
    trunk: String,
    remote: String,
    max_retries: u32,
}

impl<V: VcsPort, C: Clock> AtomicMergeExecutor<V, C> {
    pub fn new(vcs: V, clock: C, scratch_root: impl Into<PathBuf>, trunk: impl Into<String>, remote: impl Into<String>, max_retries: u32) -> Self {
        Self {
            vcs,
            clock,
            scratch_root: scratch_root.into(),
            trunk: trunk.into(),
            remote: remote.into(),
            max_retries,
        }
    }

    fn scratch_path(&self, wu_id: &WorkUnitId) -> PathBuf {
        self.scratch_root.join(format!("{}-{}", wu_id, self.clock.epoch_ms()))
    }

    /// Merge `lane_branch` into the trunk inside a scratch worktree, run
    /// `after_merge`, then push trunk. `touched_paths` (relative to the
    /// worktree) names every file `after_merge` may write; the executor
    /// snapshots their prior contents first so any failure can restore them
    /// byte-for-byte, per spec §4.G's rollback discipline. The merge,
    /// `after_merge`, and push all run against a `vcs` adapter rebound to
    /// the scratch worktree (spec §4.G step 2), never against the caller's
    /// own checkout.
    pub async fn with_atomic_merge<F, Fut>(
        &self,
        wu_id: &WorkUnitId,
        lane_branch: &str,
        touched_paths: &[PathBuf],
        after_merge: F,
    ) -> Result<(), CoordinatorError>
    where
        F: FnOnce(MergeContext<'_, V>) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        let scratch = self.scratch_path(wu_id);
        self.vcs.worktree_add(&scratch, &self.trunk, Some(&self.trunk)).await?;
        let scoped_vcs = self.vcs.scoped_to(&scratch);

        let outcome = self
            .run_merge_and_closure(&scoped_vcs, &scratch, lane_branch, touched_paths, after_merge)
            .await;

        match outcome {
            Ok(()) => {
                self.vcs.worktree_remove(&scratch, false).await?;
                Ok(())
            }
            Err(e) => {
                let _ = self.vcs.worktree_remove(&scratch, true).await;
                Err(e)
            }
        }
    }

    async fn run_merge_and_closure<F, Fut>(
        &self,
        scoped_vcs: &V,
        scratch: &Path,
        lane_branch: &str,
        touched_paths: &[PathBuf],
        after_merge: F,
    ) -> Result<(), CoordinatorError>
    where
        F: FnOnce(MergeContext<'_, V>) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        self.ff_merge_with_rebase_retry(scoped_vcs, lane_branch).await?;

        let snapshot = snapshot_files(scratch, touched_paths);

        if let Err(e) = after_merge(MergeContext {
            worktree_path: scratch,
            vcs: scoped_vcs,
        })
        .await
        {
            restore_files(&snapshot);
            return Err(e);
        }

        if let Err(e) = self.push_with_rebase_retry(scoped_vcs).await {
            restore_files(&snapshot);
            return Err(e.into());
        }

        Ok(())
    }

    async fn ff_merge_with_rebase_retry(&self, vcs: &V, lane_branch: &str) -> Result<(), CoordinatorError> {
        match vcs.merge(lane_branch, true).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_retryable() => {
                vcs.pull_rebase(&self.remote, &self.trunk).await?;
                vcs.merge(lane_branch, true).await.map_err(|e| {
                    CoordinatorError::MergeConflict {
                        lane_branch: lane_branch.to_string(),
                        reason: e.to_string(),
                    }
                })
            }
            Err(e) => Err(CoordinatorError::MergeConflict {
                lane_branch: lane_branch.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn push_with_rebase_retry(&self, vcs: &V) -> Result<(), VcsError> {
        for attempt in 0..=self.max_retries {
            match vcs.push(&self.remote, &self.trunk, false).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    vcs.pull_rebase(&self.remote, &self.trunk).await?;
                }
                Err(e) => return Err(e),
            }
        }
        // The final iteration's guard above (`attempt < self.max_retries`)
        // is always false, so every path through the loop returns.
        unreachable!("push_with_rebase_retry always returns on its final attempt")
    }
}

/// Reads the current contents of each path (if present) before it is
/// modified, so a later failure can restore them byte-for-byte.
pub(crate) fn snapshot_files(worktree: &Path, paths: &[PathBuf]) -> HashMap<PathBuf, Option<Vec<u8>>> {
    paths
        .iter()
        .map(|p| {
            let full = worktree.join(p);
            (full.clone(), std::fs::read(&full).ok())
        })
        .collect()
}

pub(crate) fn restore_files(snapshot: &HashMap<PathBuf, Option<Vec<u8>>>) {
    for (path, contents) in snapshot {
        match contents {
            Some(bytes) => {
                let _ = std::fs::write(path, bytes);
            }
            None => {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

#[cfg(test)]
#[path = "merge_executor_tests.rs"]
mod tests;

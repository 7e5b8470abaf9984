// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The central WU lifecycle coordinator (spec §4.H).

use lumenflow_core::{
    Clock, CreatedMode, EventId, EventPayload, ProcessProbe, Status, WUEvent, WorkUnit, WorkUnitId, WorkUnitSpec,
};
use lumenflow_storage::EventStore;
use lumenflow_vcs::VcsPort;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::CoordinatorError;
use crate::indexed_state::IndexedState;
use crate::lane_lock::LaneLockManager;
use crate::merge_executor::AtomicMergeExecutor;
use crate::sink::{emit_lossy, Sink, SinkTopic};

/// Returned by [`Coordinator::claim`].
#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub wu_id: WorkUnitId,
    pub branch_name: String,
    pub worktree_path: Option<PathBuf>,
}

/// Returned by [`Coordinator::done`].
#[derive(Debug, Clone, Default)]
pub struct DoneResult {
    pub success: bool,
    pub committed: bool,
    pub pushed: bool,
    pub merged: bool,
    pub pr_url: Option<String>,
    pub recovered: bool,
}

/// Returned by the already-merged recovery path inside `done`.
#[derive(Debug, Clone, Default)]
pub struct AlreadyMergedCompletionResult {
    pub success: bool,
    pub stamped: bool,
    pub yaml_updated: bool,
    pub backlog_updated: bool,
    pub errors: Vec<String>,
}

/// Orchestrates the lane lock, event log, and atomic merge executor behind
/// the public WU lifecycle operations (spec §4.H). Generic over the same
/// four ports the rest of this crate threads through.
pub struct Coordinator<V: VcsPort, S: Sink, C: Clock, P: ProcessProbe> {
    events: EventStore<C, P>,
    lane_locks: LaneLockManager<C, P>,
    merge_executor: AtomicMergeExecutor<V, C>,
    sink: S,
    clock: C,
    stamps_dir: PathBuf,
    trunk: String,
}

impl<V: VcsPort, S: Sink, C: Clock, P: ProcessProbe> Coordinator<V, S, C, P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        events: EventStore<C, P>,
        lane_locks: LaneLockManager<C, P>,
        merge_executor: AtomicMergeExecutor<V, C>,
        sink: S,
        clock: C,
        stamps_dir: impl Into<PathBuf>,
        trunk: impl Into<String>,
    ) -> Self {
        Self {
            events,
            lane_locks,
            merge_executor,
            sink,
            clock,
            stamps_dir: stamps_dir.into(),
            trunk: trunk.into(),
        }
    }

    fn next_event_id(&self) -> EventId {
        EventId::new(format!("evt-{}", self.clock.epoch_ms()))
    }

    fn stamp_path(&self, wu_id: &WorkUnitId) -> PathBuf {
        self.stamps_dir.join(format!("{wu_id}.done"))
    }

    fn write_stamp(&self, wu_id: &WorkUnitId) -> std::io::Result<()> {
        if let Some(parent) = self.stamp_path(wu_id).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(self.stamp_path(wu_id), format!("{wu_id} completed\n"))
    }

    /// Replay the event log into an [`IndexedState`]. Surfaces a repair as
    /// an informational warning; callers that need the exit-4 advisory
    /// behavior from spec §6 can inspect the log themselves via `events()`.
    pub fn load_state(&self) -> Result<IndexedState, CoordinatorError> {
        let loaded = self.events.load()?;
        if let Some(repair) = loaded.repair {
            warn!(
                lines_kept = repair.lines_kept,
                lines_removed = repair.lines_removed,
                backup = %repair.backup_path,
                "event log corruption repaired during load"
            );
        }
        Ok(IndexedState::from_events(&loaded.events))
    }

    fn append(&self, wu_id: &WorkUnitId, payload: EventPayload) -> Result<WUEvent, CoordinatorError> {
        let event = WUEvent {
            event_id: self.next_event_id(),
            timestamp: self.clock.now_rfc3339(),
            wu_id: wu_id.clone(),
            payload,
        };
        self.events.append(&event)?;
        Ok(event)
    }

    fn require(&self, state: &IndexedState, wu_id: &WorkUnitId) -> Result<WorkUnit, CoordinatorError> {
        state.wu(wu_id).cloned().ok_or_else(|| CoordinatorError::Validation {
            path: "wu_id".to_string(),
            message: format!("no such work unit: {wu_id}"),
        })
    }

    /// `create(spec) → WU` (spec §4.H). Idempotent on an already-recorded id
    /// with matching essential fields.
    pub async fn create(&self, spec: WorkUnitSpec) -> Result<WorkUnit, CoordinatorError> {
        let state = self.load_state()?;
        if let Some(existing) = state.wu(&spec.id) {
            if existing.lane == spec.lane && existing.title == spec.title {
                return Ok(existing.clone());
            }
            return Err(CoordinatorError::Validation {
                path: "wu_id".to_string(),
                message: format!("{} already exists with different lane/title", spec.id),
            });
        }

        self.append(
            &spec.id,
            EventPayload::Create {
                lane: spec.lane.clone(),
                title: spec.title.clone(),
                priority: Some(spec.priority),
                created_mode: Some(spec.created_mode),
                initiative: spec.initiative.clone(),
            },
        )?;

        let state = self.load_state()?;
        self.require(&state, &spec.id)
    }

    /// `claim(wu_id, lane, session?) → ClaimResult` (spec §4.H).
    pub async fn claim(&self, wu_id: &WorkUnitId, agent_session: Option<String>) -> Result<ClaimResult, CoordinatorError> {
        let state = self.load_state()?;
        let wu = self.require(&state, wu_id)?;

        if wu.status != Status::Ready {
            return Err(CoordinatorError::IllegalTransition {
                wu_id: wu_id.clone(),
                from: wu.status,
                to: Status::InProgress,
            });
        }

        let lane_kebab = wu.lane.kebab();
        let mut acquired = self.lane_locks.acquire(&lane_kebab, wu_id, wu.lane.as_str(), agent_session.clone())?;

        if !acquired.acquired && acquired.is_stale {
            self.lane_locks.force_remove_stale(&lane_kebab)?;
            acquired = self.lane_locks.acquire(&lane_kebab, wu_id, wu.lane.as_str(), agent_session.clone())?;
        }

        if !acquired.acquired {
            let holder = acquired.existing_lock.ok_or_else(|| {
                CoordinatorError::Bug("lane lock acquire reported failure without an existing holder".to_string())
            })?;
            return Err(CoordinatorError::LaneBusy { holder });
        }

        if let Err(e) = self.append(wu_id, EventPayload::Claim { lane: wu.lane.clone(), agent_session }) {
            let _ = self.lane_locks.release(&lane_kebab, Some(wu_id), true);
            return Err(e);
        }

        info!(%wu_id, lane = %wu.lane, "claimed");
        Ok(ClaimResult {
            wu_id: wu_id.clone(),
            branch_name: format!("lane/{lane_kebab}"),
            worktree_path: None,
        })
    }

    /// `block(wu_id, reason)` (spec §4.H). Releases the lane lock.
    pub async fn block(&self, wu_id: &WorkUnitId, reason: String) -> Result<(), CoordinatorError> {
        let state = self.load_state()?;
        let wu = self.require(&state, wu_id)?;
        if !wu.status.can_transition_to(Status::Blocked) {
            return Err(CoordinatorError::IllegalTransition {
                wu_id: wu_id.clone(),
                from: wu.status,
                to: Status::Blocked,
            });
        }
        self.append(wu_id, EventPayload::Block { reason })?;
        let _ = self.lane_locks.release(&wu.lane.kebab(), Some(wu_id), false);
        Ok(())
    }

    /// `unblock(wu_id)` (spec §4.H). Re-acquires the lane lock, failing with
    /// `LaneBusy` if another WU holds it.
    pub async fn unblock(&self, wu_id: &WorkUnitId, agent_session: Option<String>) -> Result<(), CoordinatorError> {
        let state = self.load_state()?;
        let wu = self.require(&state, wu_id)?;
        if !wu.status.can_transition_to(Status::InProgress) {
            return Err(CoordinatorError::IllegalTransition {
                wu_id: wu_id.clone(),
                from: wu.status,
                to: Status::InProgress,
            });
        }

        let lane_kebab = wu.lane.kebab();
        let acquired = self.lane_locks.acquire(&lane_kebab, wu_id, wu.lane.as_str(), agent_session)?;
        if !acquired.acquired {
            let holder = acquired.existing_lock.ok_or_else(|| {
                CoordinatorError::Bug("lane lock acquire reported failure without an existing holder".to_string())
            })?;
            return Err(CoordinatorError::LaneBusy { holder });
        }

        self.append(wu_id, EventPayload::Unblock {})?;
        Ok(())
    }

    /// `release(wu_id, reason)` (spec §4.H). Abandons without completion.
    pub async fn release(&self, wu_id: &WorkUnitId, reason: String) -> Result<(), CoordinatorError> {
        let state = self.load_state()?;
        let wu = self.require(&state, wu_id)?;
        if wu.status != Status::InProgress {
            return Err(CoordinatorError::IllegalTransition {
                wu_id: wu_id.clone(),
                from: wu.status,
                to: Status::Ready,
            });
        }
        self.append(wu_id, EventPayload::Release { reason })?;
        let _ = self.lane_locks.release(&wu.lane.kebab(), Some(wu_id), true);
        Ok(())
    }

    /// `checkpoint(wu_id, note, extra?)` (spec §4.H). Does not change status.
    pub async fn checkpoint(
        &self,
        wu_id: &WorkUnitId,
        note: String,
        session_id: Option<String>,
        progress: Option<String>,
        next_steps: Option<String>,
    ) -> Result<(), CoordinatorError> {
        self.append(
            wu_id,
            EventPayload::Checkpoint {
                note,
                session_id,
                progress,
                next_steps,
            },
        )?;
        Ok(())
    }

    /// `delegate(child_wu, parent_wu, delegation_id)` (spec §4.H). Does not
    /// itself claim a lane.
    pub async fn delegate(
        &self,
        parent_wu_id: WorkUnitId,
        child_wu_id: WorkUnitId,
        delegation_id: lumenflow_core::DelegationId,
    ) -> Result<(), CoordinatorError> {
        self.append(
            &parent_wu_id,
            EventPayload::Delegate {
                parent_wu_id,
                child_wu_id,
                delegation_id,
            },
        )?;
        Ok(())
    }

    /// `done(wu_id, options)` (spec §4.H). `write_metadata` is supplied by
    /// the caller and updates the WU YAML/backlog/status documents under
    /// the path it's handed (the core treats those formats as opaque).
    /// Branches on `created_mode`; after success in any mode, appends
    /// `complete`, releases the lane lock, and emits a lane-signal audit
    /// record. `vcs`/`work_dir` are only consulted by branch-only and
    /// branch-pr mode, which operate on the caller's own checkout rather
    /// than a scratch worktree.
    #[allow(clippy::too_many_arguments)]
    pub async fn done<F, Fut>(
        &self,
        vcs: &V,
        wu_id: &WorkUnitId,
        work_dir: &Path,
        lane_branch: &str,
        remote: &str,
        touched_paths: &[PathBuf],
        write_metadata: F,
    ) -> Result<DoneResult, CoordinatorError>
    where
        F: FnOnce(&Path) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        let state = self.load_state()?;
        let wu = self.require(&state, wu_id)?;

        if wu.status != Status::InProgress {
            return Err(CoordinatorError::IllegalTransition {
                wu_id: wu_id.clone(),
                from: wu.status,
                to: Status::Done,
            });
        }

        let result = match wu.created_mode {
            CreatedMode::Worktree => self.done_worktree(wu_id, lane_branch, touched_paths, write_metadata).await?,
            CreatedMode::BranchOnly => {
                self.done_branch_only(vcs, work_dir, lane_branch, remote, touched_paths, write_metadata).await?
            }
            CreatedMode::BranchPr => self.done_branch_pr(vcs, work_dir, lane_branch, remote, touched_paths, write_metadata).await?,
        };

        if result.success {
            self.append(wu_id, EventPayload::Complete { completed_at: self.clock.now_rfc3339() })?;
            let _ = self.lane_locks.release(&wu.lane.kebab(), Some(wu_id), true);
            self.write_stamp(wu_id).ok();
            emit_lossy(
                &self.sink,
                SinkTopic::Telemetry(format!("lane-{}", wu.lane.kebab())),
                serde_json::json!({
                    "timestamp": self.clock.now_rfc3339(),
                    "wu_id": wu_id.to_string(),
                    "lane": wu.lane.to_string(),
                    "event": "done",
                }),
            )
            .await;
        }

        Ok(result)
    }

    async fn done_worktree<F, Fut>(
        &self,
        wu_id: &WorkUnitId,
        lane_branch: &str,
        touched_paths: &[PathBuf],
        write_metadata: F,
    ) -> Result<DoneResult, CoordinatorError>
    where
        F: FnOnce(&Path) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        let commit_message = format!("complete {lane_branch}");
        let outcome = self
            .merge_executor
            .with_atomic_merge(wu_id, lane_branch, touched_paths, |ctx| async move {
                write_metadata(ctx.worktree_path).await?;
                if !touched_paths.is_empty() {
                    let full_paths: Vec<PathBuf> = touched_paths.iter().map(|p| ctx.worktree_path.join(p)).collect();
                    ctx.vcs.add(&full_paths).await?;
                    ctx.vcs.commit(&commit_message).await?;
                }
                Ok(())
            })
            .await;

        match outcome {
            Ok(()) => Ok(DoneResult {
                success: true,
                committed: true,
                pushed: true,
                merged: true,
                pr_url: None,
                recovered: false,
            }),
            Err(e) => Err(e),
        }
    }

    /// Switches to trunk, ff-merges `lane_branch` (one pull-rebase retry on
    /// non-ff), writes metadata in place with snapshot/restore-on-failure,
    /// commits, pulls-rebase once more to absorb races, then pushes.
    async fn done_branch_only<F, Fut>(
        &self,
        vcs: &V,
        work_dir: &Path,
        lane_branch: &str,
        remote: &str,
        touched_paths: &[PathBuf],
        write_metadata: F,
    ) -> Result<DoneResult, CoordinatorError>
    where
        F: FnOnce(&Path) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        vcs.checkout(&self.trunk).await?;
        match vcs.merge(lane_branch, true).await {
            Ok(()) => {}
            Err(e) if e.is_retryable() => {
                vcs.pull_rebase(remote, &self.trunk).await?;
                vcs.merge(lane_branch, true).await.map_err(|e| CoordinatorError::MergeConflict {
                    lane_branch: lane_branch.to_string(),
                    reason: e.to_string(),
                })?;
            }
            Err(e) => {
                return Err(CoordinatorError::MergeConflict {
                    lane_branch: lane_branch.to_string(),
                    reason: e.to_string(),
                })
            }
        }

        let full_paths: Vec<PathBuf> = touched_paths.iter().map(|p| work_dir.join(p)).collect();
        let snapshot = crate::merge_executor::snapshot_files(work_dir, touched_paths);
        if let Err(e) = write_metadata(work_dir).await {
            crate::merge_executor::restore_files(&snapshot);
            return Err(e);
        }

        vcs.add(&full_paths).await?;
        vcs.commit(&format!("complete {lane_branch}")).await?;
        vcs.pull_rebase(remote, &self.trunk).await?;

        if let Err(e) = vcs.push(remote, &self.trunk, false).await {
            crate::merge_executor::restore_files(&snapshot);
            return Err(e.into());
        }

        Ok(DoneResult {
            success: true,
            committed: true,
            pushed: true,
            merged: true,
            pr_url: None,
            recovered: false,
        })
    }

    /// Stays on the lane branch, writes metadata there, commits, pushes,
    /// and requests a PR via an external port (spec §1's out-of-scope
    /// collaborators — `pr_url` is left `None` here since this crate does
    /// not own that integration). Never merges to trunk.
    async fn done_branch_pr<F, Fut>(
        &self,
        vcs: &V,
        work_dir: &Path,
        lane_branch: &str,
        remote: &str,
        touched_paths: &[PathBuf],
        write_metadata: F,
    ) -> Result<DoneResult, CoordinatorError>
    where
        F: FnOnce(&Path) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        vcs.checkout(lane_branch).await?;
        write_metadata(work_dir).await?;
        let full_paths: Vec<PathBuf> = touched_paths.iter().map(|p| work_dir.join(p)).collect();
        vcs.add(&full_paths).await?;
        vcs.commit(&format!("complete {lane_branch}")).await?;
        vcs.push(remote, lane_branch, false).await?;

        Ok(DoneResult {
            success: true,
            committed: true,
            pushed: true,
            merged: false,
            pr_url: None,
            recovered: false,
        })
    }

    /// The already-merged recovery reduced path (spec §4.H): when the lane
    /// branch is gone or already merged and the worktree no longer exists,
    /// `done` falls back to stamping and updating metadata directly on
    /// trunk rather than attempting a merge that has nothing left to do.
    pub async fn complete_already_merged<F, Fut>(
        &self,
        wu_id: &WorkUnitId,
        trunk_checkout: &Path,
        write_metadata: F,
    ) -> Result<AlreadyMergedCompletionResult, CoordinatorError>
    where
        F: FnOnce(&Path) -> Fut,
        Fut: Future<Output = Result<(), CoordinatorError>>,
    {
        let mut result = AlreadyMergedCompletionResult::default();

        match write_metadata(trunk_checkout).await {
            Ok(()) => {
                result.yaml_updated = true;
                result.backlog_updated = true;
            }
            Err(e) => result.errors.push(e.to_string()),
        }

        match self.write_stamp(wu_id) {
            Ok(()) => result.stamped = true,
            Err(e) => result.errors.push(e.to_string()),
        }

        if let Err(e) = self.append(wu_id, EventPayload::Complete { completed_at: self.clock.now_rfc3339() }) {
            result.errors.push(e.to_string());
        }

        let state = self.load_state()?;
        if let Some(wu) = state.wu(wu_id) {
            let _ = self.lane_locks.release(&wu.lane.kebab(), Some(wu_id), true);
        }

        result.success = result.errors.is_empty();
        Ok(result)
    }

    /// Whether `lane_branch` is eligible for already-merged recovery: gone
    /// from the remote, or its tip is already an ancestor of (equal to the
    /// merge base with) trunk.
    pub async fn is_already_merged(&self, vcs: &V, remote: &str, lane_branch: &str) -> Result<bool, CoordinatorError> {
        if !vcs.remote_branch_exists(remote, lane_branch).await? {
            return Ok(true);
        }
        let tip = vcs.commit_hash(Some(lane_branch)).await?;
        let base = vcs.merge_base(&self.trunk, lane_branch).await?;
        Ok(tip == base)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

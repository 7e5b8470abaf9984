// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator's error taxonomy (spec §7).

use lumenflow_core::{LockEntry, Status, WorkUnitId};
use lumenflow_storage::StorageError;
use lumenflow_vcs::VcsError;
use thiserror::Error;

/// Errors surfaced by [`crate::Coordinator`] operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("validation error at {path}: {message}")]
    Validation { path: String, message: String },

    #[error("illegal transition for {wu_id}: {from} -> {to}")]
    IllegalTransition {
        wu_id: WorkUnitId,
        from: Status,
        to: Status,
    },

    #[error("lane busy: held by {}", holder.wu_id)]
    LaneBusy { holder: LockEntry },

    #[error("not owner: {wu_id} lock is held by {holder_wu_id}")]
    NotOwner {
        wu_id: WorkUnitId,
        holder_wu_id: WorkUnitId,
    },

    #[error("id generation failed after exhausting retries, last attempted {last_attempted}: {source}")]
    IdGenerationFailed {
        last_attempted: WorkUnitId,
        #[source]
        source: Box<CoordinatorError>,
    },

    #[error("event log corruption repaired: kept {lines_kept}, removed {lines_removed}, backup at {backup_path}")]
    CorruptionRepaired {
        lines_kept: usize,
        lines_removed: usize,
        backup_path: String,
    },

    #[error("merge conflict merging {lane_branch} into trunk: {reason}")]
    MergeConflict { lane_branch: String, reason: String },

    #[error("vcs error: {0}")]
    Vcs(#[from] VcsError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bug: invariant violated: {0}")]
    Bug(String),
}

impl CoordinatorError {
    /// Whether this error reflects a transient VCS collision the caller may
    /// retry (non-ff push, fetch-required), per spec §4.B / §7.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoordinatorError::Vcs(e) if e.is_retryable())
    }

    /// Exit code for direct CLI callers of the coordinator (spec §6).
    pub fn exit_code(&self) -> i32 {
        match self {
            CoordinatorError::Validation { .. } | CoordinatorError::IllegalTransition { .. } => 2,
            CoordinatorError::LaneBusy { .. } => 3,
            CoordinatorError::CorruptionRepaired { .. } => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn/delegation tracking records (spec §3, §4.I).

use crate::ids::{SpawnId, WorkUnitId};
use crate::lane::Lane;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a spawned child WU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnStatus {
    Pending,
    Running,
    Completed,
    Crashed,
    Timeout,
    Stuck,
}

impl SpawnStatus {
    /// Terminal outcomes that `recover()` never revisits.
    pub fn is_terminal(self) -> bool {
        matches!(self, SpawnStatus::Completed | SpawnStatus::Crashed | SpawnStatus::Timeout)
    }
}

/// A parent WU's delegation to a child WU, tracked in the spawn registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub spawn_id: SpawnId,
    pub parent_wu: WorkUnitId,
    pub target_wu: WorkUnitId,
    pub lane: Lane,
    pub spawned_at: String,
    pub status: SpawnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[cfg(test)]
#[path = "spawn_record_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initiative wave manifests (spec §3, §4.J, §6).

use crate::ids::WorkUnitId;
use crate::lane::Lane;
use serde::{Deserialize, Serialize};

/// One WU's entry in a wave manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    pub id: WorkUnitId,
    pub lane: Lane,
    pub status: String,
}

impl WaveEntry {
    /// Every wave entry is spawned in this status; a named constant keeps
    /// callers from hand-typing the string.
    pub const SPAWNED: &'static str = "spawned";

    pub fn spawned(id: WorkUnitId, lane: Lane) -> Self {
        Self {
            id,
            lane,
            status: Self::SPAWNED.to_string(),
        }
    }
}

/// A persisted (or dry-run) batch of WUs selected for parallel execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveManifest {
    pub initiative: String,
    pub wave: u64,
    pub created_at: String,
    pub wus: Vec<WaveEntry>,
}

#[cfg(test)]
#[path = "wave_tests.rs"]
mod tests;

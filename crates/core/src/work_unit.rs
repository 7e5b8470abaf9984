// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work unit record and the small enums attached to it.
//!
//! The record itself lives on disk as YAML, owned by an external parser
//! (out of scope for this crate — see spec §1). This module defines the
//! validated, already-parsed shape the coordinator consumes and updates its
//! status projection against.

use crate::ids::WorkUnitId;
use crate::lane::Lane;
use crate::status::Status;
use serde::{Deserialize, Serialize};

/// How a work unit's branch/worktree was provisioned, which determines the
/// completion path `done` takes (spec §4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedMode {
    Worktree,
    BranchOnly,
    BranchPr,
}

/// Priority, highest to lowest: P0 > P1 > P2 > P3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

/// A unit of work, as handed to the coordinator by the external spec
/// parser. Fields beyond the ones listed here are opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: WorkUnitId,
    pub lane: Lane,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    pub created_mode: CreatedMode,
    /// Ordered sequence of path-glob strings this WU is expected to touch.
    #[serde(default)]
    pub code_paths: Vec<String>,
    #[serde(default)]
    pub initiative: Option<String>,
    #[serde(default)]
    pub blocked_by: Vec<WorkUnitId>,
    #[serde(default)]
    pub blocks: Vec<WorkUnitId>,
    #[serde(default)]
    pub dependencies: Vec<WorkUnitId>,
}

/// Input to [`crate::event::Event::Create`] / the coordinator's `create`
/// operation — an already-validated spec handed in by the external parser.
#[derive(Debug, Clone)]
pub struct WorkUnitSpec {
    pub id: WorkUnitId,
    pub lane: Lane,
    pub title: String,
    pub priority: Priority,
    pub created_mode: CreatedMode,
    pub code_paths: Vec<String>,
    pub initiative: Option<String>,
}

#[cfg(test)]
#[path = "work_unit_tests.rs"]
mod tests;

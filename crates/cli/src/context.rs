// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires a [`Coordinator`] against the real git/clock/process-probe ports
//! for a given project root.

use lumenflow_core::{SystemClock, UnixProcessProbe};
use lumenflow_coordinator::{AtomicMergeExecutor, Config, Coordinator, FileSink, LaneLockManager};
use lumenflow_storage::EventStore;
use lumenflow_vcs::GitVcs;
use std::path::{Path, PathBuf};

pub type Coord = Coordinator<GitVcs, FileSink, SystemClock, UnixProcessProbe>;

pub struct Context {
    pub project_root: PathBuf,
    pub config: Config,
    pub vcs: GitVcs,
}

impl Context {
    pub fn new(project_root: &Path) -> Self {
        let config = Config::load(project_root);
        let vcs = GitVcs::new(project_root);
        Self {
            project_root: project_root.to_path_buf(),
            config,
            vcs,
        }
    }

    pub fn coordinator(&self) -> Coord {
        let events = EventStore::new(self.config.paths.event_log(), SystemClock, UnixProcessProbe);
        let lane_locks = LaneLockManager::new(
            self.config.paths.lane_lock_dir(),
            SystemClock,
            UnixProcessProbe,
            self.config.stale_lock_threshold,
        );
        let merge_executor = AtomicMergeExecutor::new(
            self.vcs.clone(),
            SystemClock,
            self.project_root.join(".lumenflow/scratch"),
            "main",
            "origin",
            self.config.merge_max_retries,
        );
        let sink = FileSink::new(
            self.config.paths.telemetry_dir(),
            self.config.paths.recovery_dir(),
            self.config.paths.force_bypass_log(),
        );
        Coordinator::new(
            events,
            lane_locks,
            merge_executor,
            sink,
            SystemClock,
            self.config.paths.stamps_dir(),
            "main",
        )
    }
}

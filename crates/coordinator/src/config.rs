// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved state-root layout and tunables (spec §4.L).

use std::path::{Path, PathBuf};
use std::time::Duration;

/// File and directory layout rooted under the state directory (default
/// `.lumenflow/`), overridable via `LUMENFLOW_STATE_DIR`.
#[derive(Debug, Clone)]
pub struct Paths {
    pub root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn event_log(&self) -> PathBuf {
        self.root.join("state/wu-events.jsonl")
    }

    pub fn event_log_lock(&self) -> PathBuf {
        self.root.join("state/wu-events.jsonl.lock")
    }

    pub fn lane_lock_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    pub fn lane_lock(&self, lane_kebab: &str) -> PathBuf {
        self.lane_lock_dir().join(format!("{lane_kebab}.lock"))
    }

    pub fn stamps_dir(&self) -> PathBuf {
        self.root.join("stamps")
    }

    pub fn stamp(&self, wu_id: &str) -> PathBuf {
        self.stamps_dir().join(format!("{wu_id}.done"))
    }

    pub fn telemetry_dir(&self) -> PathBuf {
        self.root.join("telemetry")
    }

    pub fn recovery_dir(&self) -> PathBuf {
        self.root.join("recovery")
    }

    pub fn waves_dir(&self) -> PathBuf {
        self.root.join("artifacts/waves")
    }

    pub fn force_bypass_log(&self) -> PathBuf {
        self.root.join("force-bypasses.log")
    }
}

/// Tunables with environment-variable overrides, per spec §4.L.
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    /// How long a lane lock may sit untouched before it is eligible for
    /// stale reclamation, absent liveness information. Default 2h.
    pub stale_lock_threshold: Duration,
    /// How long a spawn may go without a checkpoint before recovery
    /// escalates it to `stuck`. Default 1h.
    pub no_checkpoint_threshold: Duration,
    /// ID-generator push-collision retry budget. Default 3.
    pub id_generator_max_retries: u32,
    /// Atomic-merge rebase/push retry budget. Default 3.
    pub merge_max_retries: u32,
    /// Base delay for exponential backoff across retry loops. Default 200ms.
    pub backoff_base: Duration,
}

impl Config {
    /// Resolve configuration for a project rooted at `project_root`, with
    /// `.lumenflow/` as the default state directory and env var overrides
    /// applied on top.
    pub fn load(project_root: &Path) -> Self {
        let state_root = std::env::var("LUMENFLOW_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join(".lumenflow"));

        Self {
            paths: Paths::new(state_root),
            stale_lock_threshold: env_duration_secs("LUMENFLOW_STALE_LOCK_SECS", Duration::from_secs(2 * 60 * 60)),
            no_checkpoint_threshold: env_duration_secs("LUMENFLOW_NO_CHECKPOINT_SECS", Duration::from_secs(60 * 60)),
            id_generator_max_retries: env_u32("LUMENFLOW_ID_GEN_MAX_RETRIES", 3),
            merge_max_retries: env_u32("LUMENFLOW_MERGE_MAX_RETRIES", 3),
            backoff_base: env_duration_millis("LUMENFLOW_BACKOFF_BASE_MS", Duration::from_millis(200)),
        }
    }
}

fn env_duration_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_duration_millis(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_u32(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

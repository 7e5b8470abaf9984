// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL store for [`WUEvent`] records, with exclusive-create
//! locking and corruption repair (spec §4.C).

use crate::error::StorageError;
use crate::pid_lock;
use lumenflow_core::{Clock, ProcessProbe, WUEvent};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Fraction of non-empty lines that must fail to parse before the file is
/// treated as corrupt and repaired rather than merely logging bad lines.
pub const CORRUPTION_THRESHOLD: f64 = 0.25;

const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(2 * 3600);
const DEFAULT_MAX_LOCK_ATTEMPTS: u32 = 20;
const DEFAULT_LOCK_BACKOFF: Duration = Duration::from_millis(20);

/// Result of [`EventStore::load`]: the valid events in original order, plus
/// a repair record if the file was found corrupt and rewritten.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub events: Vec<WUEvent>,
    pub repair: Option<RepairRecord>,
}

/// Describes a corruption repair performed during `load()` (spec §4.C).
#[derive(Debug, Clone, serde::Serialize)]
pub struct RepairRecord {
    pub lines_kept: usize,
    pub lines_removed: usize,
    pub backup_path: String,
    pub warnings: Vec<String>,
}

/// Owns the event log file path and its sibling `.lock` path. Stateless
/// between calls: every `load`/`append` re-opens the file, matching the
/// "content-addressed file, not a database" design note.
#[derive(Debug, Clone)]
pub struct EventStore<C: Clock, P: ProcessProbe> {
    path: PathBuf,
    lock_path: PathBuf,
    clock: C,
    probe: P,
    stale_after: Duration,
    max_lock_attempts: u32,
    lock_backoff: Duration,
}

impl<C: Clock, P: ProcessProbe> EventStore<C, P> {
    pub fn new(path: impl Into<PathBuf>, clock: C, probe: P) -> Self {
        let path = path.into();
        let lock_path = lock_sibling_path(&path);
        Self {
            path,
            lock_path,
            clock,
            probe,
            stale_after: DEFAULT_STALE_AFTER,
            max_lock_attempts: DEFAULT_MAX_LOCK_ATTEMPTS,
            lock_backoff: DEFAULT_LOCK_BACKOFF,
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every line, validate it, and return events in original order.
    /// If the invalid-line ratio meets [`CORRUPTION_THRESHOLD`], the file is
    /// backed up and rewritten with only the valid lines.
    pub fn load(&self) -> Result<LoadResult, StorageError> {
        let _guard = self.lock()?;
        self.load_locked()
    }

    fn load_locked(&self) -> Result<LoadResult, StorageError> {
        if !self.path.exists() {
            return Ok(LoadResult {
                events: Vec::new(),
                repair: None,
            });
        }

        let (events, valid_lines, total_lines, warnings) = self.scan()?;

        if total_lines == 0 {
            return Ok(LoadResult {
                events,
                repair: None,
            });
        }

        let invalid = total_lines - valid_lines.len();
        let ratio = invalid as f64 / total_lines as f64;

        if ratio < CORRUPTION_THRESHOLD {
            return Ok(LoadResult {
                events,
                repair: None,
            });
        }

        let backup_path = self.backup_path();
        fs::copy(&self.path, &backup_path)?;

        let mut tmp = File::create(self.path.with_extension("tmp"))?;
        for line in &valid_lines {
            tmp.write_all(line.as_bytes())?;
            tmp.write_all(b"\n")?;
        }
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(self.path.with_extension("tmp"), &self.path)?;

        let repair = RepairRecord {
            lines_kept: valid_lines.len(),
            lines_removed: invalid,
            backup_path: backup_path.display().to_string(),
            warnings,
        };
        warn!(
            lines_kept = repair.lines_kept,
            lines_removed = repair.lines_removed,
            backup = %repair.backup_path,
            "event log corruption detected, repaired"
        );

        Ok(LoadResult {
            events,
            repair: Some(repair),
        })
    }

    /// Scan the file, returning `(events, valid_raw_lines, total_nonempty_lines, warnings)`.
    fn scan(&self) -> Result<(Vec<WUEvent>, Vec<String>, usize, Vec<String>), StorageError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        let mut valid_lines = Vec::new();
        let mut warnings = Vec::new();
        let mut total = 0usize;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            total += 1;

            match serde_json::from_str::<WUEvent>(trimmed) {
                Ok(event) => {
                    events.push(event);
                    valid_lines.push(trimmed.to_string());
                }
                Err(err) => {
                    warnings.push(format!("line {}: {}", lineno + 1, err));
                }
            }
        }

        Ok((events, valid_lines, total, warnings))
    }

    /// Append one event under the exclusive lock. Does not itself validate
    /// the event against the state machine; callers validate against their
    /// in-memory [`lumenflow_core`] projection before calling this.
    pub fn append(&self, event: &WUEvent) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        file.write_all(&line)?;
        info!(event_id = %event.event_id, wu_id = %event.wu_id, "appended event");
        Ok(())
    }

    fn lock(&self) -> Result<pid_lock::PidLockGuard, StorageError> {
        pid_lock::acquire(
            &self.lock_path,
            &self.clock,
            &self.probe,
            self.stale_after,
            self.max_lock_attempts,
            self.lock_backoff,
        )
    }

    fn backup_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(format!(".backup.{}", self.clock.epoch_ms()));
        PathBuf::from(os)
    }
}

fn lock_sibling_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".lock");
    PathBuf::from(os)
}

#[cfg(test)]
#[path = "event_store_tests.rs"]
mod tests;

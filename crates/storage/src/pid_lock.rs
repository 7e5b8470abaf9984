// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive-create file locking shared by the event log and spawn registry
//! append paths. Lane locks (with their richer `LockEntry` wire shape and
//! audited-unlock semantics) are a separate concern, built in the
//! coordinator on top of the same `create_new` primitive.

use crate::error::StorageError;
use lumenflow_core::{Clock, ProcessProbe};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Minimal owner record written into a `.lock` sibling file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockOwner {
    pid: i64,
    timestamp_epoch_ms: u64,
}

/// A held exclusive-create lock. Removes the lock file on drop.
pub struct PidLockGuard {
    path: PathBuf,
}

impl Drop for PidLockGuard {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %err, "failed to remove lock file on drop");
            }
        }
    }
}

/// Acquire `path` via exclusive-create, retrying with bounded backoff while a
/// live owner holds it. A lock older than `stale_after` and owned by a dead
/// PID is removed and one more attempt is made in its place.
pub fn acquire<C: Clock, P: ProcessProbe>(
    path: &Path,
    clock: &C,
    probe: &P,
    stale_after: Duration,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<PidLockGuard, StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let owner = LockOwner {
        pid: std::process::id() as i64,
        timestamp_epoch_ms: clock.epoch_ms(),
    };
    let body = serde_json::to_vec(&owner)?;

    for attempt in 0..max_attempts {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(&body)?;
                file.sync_all()?;
                return Ok(PidLockGuard {
                    path: path.to_path_buf(),
                });
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                if try_reclaim_stale(path, clock, probe, stale_after) {
                    continue;
                }
                thread::sleep(base_delay * (attempt + 1));
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(StorageError::LockContention {
        path: path.display().to_string(),
        attempts: max_attempts,
    })
}

/// Remove `path` if it names a stale lock (dead PID, past `stale_after`).
/// Returns true if a removal was performed.
fn try_reclaim_stale<C: Clock, P: ProcessProbe>(
    path: &Path,
    clock: &C,
    probe: &P,
    stale_after: Duration,
) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(owner) = serde_json::from_str::<LockOwner>(&contents) else {
        return false;
    };

    let age_ms = clock.epoch_ms().saturating_sub(owner.timestamp_epoch_ms);
    let is_old = age_ms > stale_after.as_millis() as u64;
    let is_dead = !probe.is_alive(owner.pid);

    if is_old && is_dead {
        warn!(
            path = %path.display(),
            pid = owner.pid,
            age_ms,
            "removing stale event-log lock held by a dead process"
        );
        let _ = std::fs::remove_file(path);
        true
    } else {
        false
    }
}

#[cfg(test)]
#[path = "pid_lock_tests.rs"]
mod tests;

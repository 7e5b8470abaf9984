// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic exclusive-create lane locking with zombie/stale detection and
//! audited release (spec §4.E).

use lumenflow_core::{Clock, LockEntry, ProcessProbe, WorkUnitId};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaneLockError {
    #[error("io error on lock file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lock file {path} has malformed contents: {message}")]
    Corrupt { path: String, message: String },
    #[error("refusing to release lock for {lane}: held by {holder_wu_id}, caller is {caller_wu_id}")]
    NotOwner {
        lane: String,
        holder_wu_id: WorkUnitId,
        caller_wu_id: WorkUnitId,
    },
    #[error("audited unlock of {lane} requires a non-empty reason")]
    MissingReason { lane: String },
}

/// Outcome of [`LaneLockManager::acquire`].
#[derive(Debug, Clone)]
pub struct AcquireResult {
    pub acquired: bool,
    pub existing_lock: Option<LockEntry>,
    pub is_stale: bool,
}

/// Outcome of [`LaneLockManager::release`].
#[derive(Debug, Clone)]
pub struct ReleaseResult {
    pub released: bool,
    pub not_found: bool,
}

/// Outcome of [`LaneLockManager::check`].
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub locked: bool,
    pub metadata: Option<LockEntry>,
    pub is_stale: bool,
}

/// Audit record written by [`LaneLockManager::audited_unlock`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct UnlockAudit {
    pub timestamp: String,
    pub lane: String,
    pub action: &'static str,
    pub reason: String,
    pub forced: bool,
}

pub struct LaneLockManager<C: Clock, P: ProcessProbe> {
    lock_dir: PathBuf,
    clock: C,
    probe: P,
    stale_after: Duration,
}

impl<C: Clock, P: ProcessProbe> LaneLockManager<C, P> {
    pub fn new(lock_dir: impl Into<PathBuf>, clock: C, probe: P, stale_after: Duration) -> Self {
        Self {
            lock_dir: lock_dir.into(),
            clock,
            probe,
            stale_after,
        }
    }

    fn path_for(&self, lane_kebab: &str) -> PathBuf {
        self.lock_dir.join(format!("{lane_kebab}.lock"))
    }

    fn read(&self, path: &Path) -> Result<Option<LockEntry>, LaneLockError> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(|e| LaneLockError::Corrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LaneLockError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn write_exclusive(&self, path: &Path, entry: &LockEntry) -> Result<bool, LaneLockError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LaneLockError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        // LockEntry is a plain struct of strings/ints/Option<String>, which
        // serde_json can always render.
        #[allow(clippy::expect_used)]
        let body = serde_json::to_string_pretty(entry).expect("LockEntry always serializes");
        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                use std::io::Write as _;
                file.write_all(body.as_bytes()).map_err(|source| LaneLockError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(LaneLockError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn remove(&self, path: &Path) -> Result<(), LaneLockError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LaneLockError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn is_stale(&self, entry: &LockEntry) -> bool {
        let now = self.clock.epoch_ms();
        let timestamp_ms = parse_epoch_ms(&entry.timestamp).unwrap_or(now);
        now.saturating_sub(timestamp_ms) > self.stale_after.as_millis() as u64
    }

    fn is_zombie(&self, entry: &LockEntry) -> bool {
        !self.probe.is_alive(entry.pid)
    }

    /// Acquire a lane lock for `wu_id`, per spec §4.E.
    pub fn acquire(&self, lane_kebab: &str, wu_id: &WorkUnitId, lane_name: &str, agent_session: Option<String>) -> Result<AcquireResult, LaneLockError> {
        let path = self.path_for(lane_kebab);
        let entry = LockEntry {
            wu_id: wu_id.clone(),
            lane: lane_name.to_string(),
            timestamp: self.clock.now_rfc3339(),
            pid: std::process::id() as i64,
            agent_session,
        };

        if self.write_exclusive(&path, &entry)? {
            return Ok(AcquireResult {
                acquired: true,
                existing_lock: None,
                is_stale: false,
            });
        }

        let Some(existing) = self.read(&path)? else {
            // Lock disappeared between the failed create and our read; the
            // caller should retry the whole acquire.
            return self.acquire(lane_kebab, wu_id, lane_name, entry.agent_session);
        };

        if existing.wu_id == *wu_id {
            // Re-acquisition by the same owner is idempotent success.
            self.write_refresh(&path, &entry)?;
            return Ok(AcquireResult {
                acquired: true,
                existing_lock: Some(existing),
                is_stale: false,
            });
        }

        if self.is_zombie(&existing) {
            self.remove(&path)?;
            if self.write_exclusive(&path, &entry)? {
                return Ok(AcquireResult {
                    acquired: true,
                    existing_lock: Some(existing),
                    is_stale: false,
                });
            }
        }

        let stale = self.is_stale(&existing);
        Ok(AcquireResult {
            acquired: false,
            existing_lock: Some(existing),
            is_stale: stale,
        })
    }

    fn write_refresh(&self, path: &Path, entry: &LockEntry) -> Result<(), LaneLockError> {
        // LockEntry is a plain struct of strings/ints/Option<String>, which
        // serde_json can always render.
        #[allow(clippy::expect_used)]
        let body = serde_json::to_string_pretty(entry).expect("LockEntry always serializes");
        fs::write(path, body).map_err(|source| LaneLockError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Release a lane lock, per spec §4.E.
    pub fn release(&self, lane_kebab: &str, wu_id: Option<&WorkUnitId>, force: bool) -> Result<ReleaseResult, LaneLockError> {
        let path = self.path_for(lane_kebab);
        let Some(existing) = self.read(&path)? else {
            return Ok(ReleaseResult {
                released: true,
                not_found: true,
            });
        };

        if let Some(wu_id) = wu_id {
            if existing.wu_id != *wu_id && !force {
                return Err(LaneLockError::NotOwner {
                    lane: lane_kebab.to_string(),
                    holder_wu_id: existing.wu_id,
                    caller_wu_id: wu_id.clone(),
                });
            }
        }

        self.remove(&path)?;
        Ok(ReleaseResult {
            released: true,
            not_found: false,
        })
    }

    /// Read-only lock status, per spec §4.E.
    pub fn check(&self, lane_kebab: &str) -> Result<CheckResult, LaneLockError> {
        let path = self.path_for(lane_kebab);
        match self.read(&path)? {
            Some(entry) => {
                let stale = self.is_stale(&entry);
                Ok(CheckResult {
                    locked: true,
                    metadata: Some(entry),
                    is_stale: stale,
                })
            }
            None => Ok(CheckResult {
                locked: false,
                metadata: None,
                is_stale: false,
            }),
        }
    }

    /// Remove the lock only if it is stale.
    pub fn force_remove_stale(&self, lane_kebab: &str) -> Result<ReleaseResult, LaneLockError> {
        let path = self.path_for(lane_kebab);
        let Some(existing) = self.read(&path)? else {
            return Ok(ReleaseResult {
                released: true,
                not_found: true,
            });
        };
        if !self.is_stale(&existing) {
            return Ok(ReleaseResult {
                released: false,
                not_found: false,
            });
        }
        self.remove(&path)?;
        Ok(ReleaseResult {
            released: true,
            not_found: false,
        })
    }

    /// Remove a lock with an audit trail. Zombie and stale locks may be
    /// removed without `force`; an active lock requires `force=true`.
    /// `reason` must be non-empty.
    pub fn audited_unlock(&self, lane_kebab: &str, lane_name: &str, reason: &str, force: bool) -> Result<(ReleaseResult, Option<UnlockAudit>), LaneLockError> {
        if reason.trim().is_empty() {
            return Err(LaneLockError::MissingReason {
                lane: lane_kebab.to_string(),
            });
        }
        let path = self.path_for(lane_kebab);
        let Some(existing) = self.read(&path)? else {
            return Ok((
                ReleaseResult {
                    released: true,
                    not_found: true,
                },
                None,
            ));
        };

        let removable = self.is_zombie(&existing) || self.is_stale(&existing) || force;
        if !removable {
            return Ok((
                ReleaseResult {
                    released: false,
                    not_found: false,
                },
                None,
            ));
        }

        self.remove(&path)?;
        let audit = UnlockAudit {
            timestamp: self.clock.now_rfc3339(),
            lane: lane_name.to_string(),
            action: "audited_unlock",
            reason: reason.to_string(),
            forced: force,
        };
        Ok((
            ReleaseResult {
                released: true,
                not_found: false,
            },
            Some(audit),
        ))
    }
}

fn parse_epoch_ms(timestamp: &str) -> Option<u64> {
    // RFC3339 `...YYYY-MM-DDTHH:MM:SS.mmmZ`; we only need relative staleness,
    // so round-trip through the same formatter the clock port uses.
    lumenflow_core::clock::rfc3339_to_epoch_ms(timestamp)
}

#[cfg(test)]
#[path = "lane_lock_tests.rs"]
mod tests;

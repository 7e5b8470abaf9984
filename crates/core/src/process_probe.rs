// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness probing for PIDs recorded in lock files and spawn records.

use std::process::{Command, Stdio};

/// Checks whether the OS still considers a given PID a live process.
pub trait ProcessProbe: Clone + Send + Sync + 'static {
    /// Returns `true` iff `pid` names a live process.
    ///
    /// `pid <= 0` or otherwise malformed always returns `false`. Any error
    /// other than "no such process" is treated as fail-closed: the process
    /// is assumed alive, so a transient probe failure never causes a live
    /// agent's lock to be mistaken for a zombie.
    fn is_alive(&self, pid: i64) -> bool;
}

/// Probes liveness via `kill -0 <pid>`, matching the exit-code contract the
/// `kill` utility exposes: success means the signal could be delivered
/// (process exists and we can signal it); failure requires inspecting the
/// message to tell "no such process" apart from "permission denied" (which
/// still implies the process is alive).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcessProbe;

impl ProcessProbe for UnixProcessProbe {
    fn is_alive(&self, pid: i64) -> bool {
        if pid <= 0 {
            return false;
        }

        let output = Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                // "No such process" is the only message that safely proves
                // the PID is dead; anything else (permission denied, kill
                // not found, etc.) fails closed in favor of "alive".
                !stderr.to_lowercase().contains("no such process")
            }
            Err(_) => true,
        }
    }
}

/// Scriptable probe for tests: alive unless the PID is listed as dead.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeProcessProbe {
    dead_pids: std::sync::Arc<parking_lot::Mutex<std::collections::HashSet<i64>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeProcessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a PID as dead for subsequent `is_alive` calls.
    pub fn kill(&self, pid: i64) {
        self.dead_pids.lock().insert(pid);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ProcessProbe for FakeProcessProbe {
    fn is_alive(&self, pid: i64) -> bool {
        if pid <= 0 {
            return false;
        }
        !self.dead_pids.lock().contains(&pid)
    }
}

#[cfg(test)]
#[path = "process_probe_tests.rs"]
mod tests;

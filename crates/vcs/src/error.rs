// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VCS errors and the push/merge collision classifier.

use thiserror::Error;

/// Substrings that identify a git failure as a transient, retryable
/// collision rather than a real, fatal error. Documented as an extension
/// point (spec §9): add a new pattern here rather than growing a regex.
const RETRYABLE_PATTERNS: &[&str] = &[
    "non-fast-forward",
    "fetch first",
    "cannot lock ref",
    "remote rejected",
    "push rejected",
    "failed to push",
    "stale info",
];

/// Errors surfaced by a [`crate::VcsPort`] implementation.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git {command} failed (exit {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("git {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("io error running git {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid utf-8 in git output for {command}")]
    InvalidUtf8 { command: String },
}

impl VcsError {
    /// Whether the core should classify this as [`Retryable`](VcsError) per
    /// spec §4.B / §7, i.e. the caller may re-fetch and retry rather than
    /// surfacing the error as fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            VcsError::CommandFailed { stderr, .. } => {
                let lower = stderr.to_lowercase();
                RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
            }
            VcsError::Timeout { .. } => true,
            VcsError::Io { .. } | VcsError::InvalidUtf8 { .. } => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

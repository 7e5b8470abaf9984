// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lane identifiers and the kebab-case mapping to lock/file names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named serialization domain. At most one non-terminal WU may hold a
/// lane's lock at any instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lane(String);

impl Lane {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kebab-case normalization used for lock and lane-derived file names.
    ///
    /// Total function: colons and spaces collapse to single hyphens, the
    /// whole thing is lowercased, and runs of hyphens are collapsed so
    /// `"Operations:  Tooling"` and `"Operations: Tooling"` map to the same
    /// file name.
    pub fn kebab(&self) -> String {
        kebab_case(&self.0)
    }
}

/// Kebab-case normalization: lowercase, collapse whitespace/colons/hyphens
/// into single hyphens, trim leading/trailing hyphens.
pub fn kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_sep = false;
    for c in s.chars() {
        if c == ':' || c.is_whitespace() || c == '-' || c == '_' {
            if !last_was_sep && !out.is_empty() {
                out.push('-');
                last_was_sep = true;
            }
        } else {
            for lower in c.to_lowercase() {
                out.push(lower);
            }
            last_was_sep = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Lane {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Lane {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for Lane {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Unique identifier for a single append to the WU event log.
    pub struct EventId;
}

crate::define_id! {
    /// Unique identifier for a spawn/delegation record.
    pub struct SpawnId;
}

crate::define_id! {
    /// Unique identifier for a delegation linking a parent WU to a child WU.
    pub struct DelegationId;
}

/// Error returned when a string does not have the `WU-<n>` shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid work unit id: {0:?} (expected WU-<n>)")]
pub struct InvalidWorkUnitId(pub String);

/// Identifier for a work unit, always of the form `WU-<n>` where `n` is a
/// positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkUnitId(String);

impl WorkUnitId {
    /// Construct a `WU-<n>` id from its numeric component.
    pub fn from_number(n: u64) -> Self {
        Self(format!("WU-{n}"))
    }

    /// Parse and validate a `WU-<n>` string.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidWorkUnitId> {
        let s = s.as_ref();
        let Some(rest) = s.strip_prefix("WU-") else {
            return Err(InvalidWorkUnitId(s.to_string()));
        };
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidWorkUnitId(s.to_string()));
        }
        let n: u64 = rest.parse().map_err(|_| InvalidWorkUnitId(s.to_string()))?;
        if n == 0 {
            return Err(InvalidWorkUnitId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// The numeric component of the id.
    pub fn number(&self) -> u64 {
        self.0
            .strip_prefix("WU-")
            .and_then(|rest| rest.parse().ok())
            .unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for WorkUnitId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WorkUnitId {
    type Error = InvalidWorkUnitId;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for WorkUnitId {
    type Error = InvalidWorkUnitId;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Carries a coordinator-assigned exit code through an `anyhow::Error`.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    message: String,
}

impl ExitError {
    pub fn from_coordinator(err: &lumenflow_coordinator::CoordinatorError) -> anyhow::Error {
        anyhow::Error::new(ExitError {
            code: err.exit_code(),
            message: err.to_string(),
        })
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-aware, collision-free WU id allocation (spec §4.F).

use lumenflow_core::WorkUnitId;
use lumenflow_vcs::VcsPort;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::CoordinatorError;

fn max_wu_number_in_names<'a>(names: impl Iterator<Item = &'a str>, suffix: &str) -> Option<u64> {
    names
        .filter_map(|name| name.strip_suffix(suffix))
        .filter_map(|stem| WorkUnitId::parse(stem).ok())
        .map(|id| id.number())
        .max()
}

fn local_dir_max(dir: &Path, suffix: &str) -> Option<u64> {
    let entries = std::fs::read_dir(dir).ok()?;
    let names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    max_wu_number_in_names(names.iter().map(String::as_str), suffix)
}

/// Scans up to five sources for the highest existing `WU-<n>` and returns
/// `n + 1`. A failed remote fetch degrades to the local-only maximum with a
/// warning, per spec §4.F.
pub async fn next_wu_id<V: VcsPort>(
    vcs: &V,
    remote: &str,
    remote_ref: &str,
    wu_docs_dir: &Path,
    stamps_dir: &Path,
    wu_docs_remote_dir: &str,
    event_log_path_in_repo: &str,
) -> WorkUnitId {
    let mut max_n = local_dir_max(wu_docs_dir, ".yaml").unwrap_or(0);
    max_n = max_n.max(local_dir_max(stamps_dir, ".done").unwrap_or(0));

    match remote_scan(vcs, remote, remote_ref, wu_docs_remote_dir, event_log_path_in_repo).await {
        Ok(remote_max) => max_n = max_n.max(remote_max),
        Err(e) => {
            tracing::warn!(error = %e, "remote id scan failed, falling back to local maximum");
        }
    }

    WorkUnitId::from_number(max_n + 1)
}

async fn remote_scan<V: VcsPort>(
    vcs: &V,
    remote: &str,
    remote_ref: &str,
    wu_docs_remote_dir: &str,
    event_log_path_in_repo: &str,
) -> Result<u64, lumenflow_vcs::VcsError> {
    vcs.fetch(Some(remote), Some(remote_ref)).await?;
    let rref = format!("{remote}/{remote_ref}");

    let mut max_n = 0;
    if let Ok(names) = vcs.list_tree_at_ref(&rref, wu_docs_remote_dir).await {
        if let Some(n) = max_wu_number_in_names(names.iter().map(String::as_str), ".yaml") {
            max_n = max_n.max(n);
        }
    }
    if let Ok(names) = vcs.list_tree_at_ref(&rref, "stamps").await {
        if let Some(n) = max_wu_number_in_names(names.iter().map(String::as_str), ".done") {
            max_n = max_n.max(n);
        }
    }
    if let Ok(contents) = vcs.show_file_at_ref(&rref, event_log_path_in_repo).await {
        for line in contents.lines() {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(wu_id) = value.get("wu_id").and_then(|v| v.as_str()) {
                    if let Ok(id) = WorkUnitId::parse(wu_id) {
                        max_n = max_n.max(id.number());
                    }
                }
            }
        }
    }
    Ok(max_n)
}

/// Retries `create_fn` up to `max_retries` times when it fails with a
/// retryable VCS push collision, re-fetching and regenerating the id each
/// time, per spec §4.F. `create_fn` reports the id it attempted alongside
/// any error so the final failure can name it.
pub async fn retry_on_push_collision<F, Fut>(
    mut create_fn: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<WorkUnitId, CoordinatorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<WorkUnitId, (WorkUnitId, CoordinatorError)>>,
{
    for attempt in 0..=max_retries {
        match create_fn().await {
            Ok(id) => return Ok(id),
            Err((attempted, e)) if e.is_retryable() => {
                if attempt < max_retries {
                    sleep(base_delay * (attempt + 1)).await;
                    continue;
                }
                return Err(CoordinatorError::IdGenerationFailed {
                    last_attempted: attempted,
                    source: Box::new(e),
                });
            }
            Err((_, e)) => return Err(e),
        }
    }

    // The final iteration (attempt == max_retries) always returns above,
    // whether it retries, succeeds, or exhausts retries.
    unreachable!("retry_on_push_collision always returns on its final attempt")
}

#[cfg(test)]
#[path = "id_generator_tests.rs"]
mod tests;

//! Run-state reconciliation: which identifiers still need hydrating.
//!
//! Three files define the state: the input id list, the output store
//! (its `id` column = already hydrated) and the failure log (one id per
//! line = already given up on). The work set for a run is computed once
//! at startup from all three; it is never recomputed mid-run.

use std::path::Path;

use rustc_hash::FxHashSet;

/// Load the candidate id list. Blank lines are skipped, whitespace trimmed.
///
/// Unlike the state readers below, a read failure here is for the caller
/// to escalate: without an input list there is no run.
pub fn load_ids(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Ids already present in the output store (`id` column).
///
/// Missing file means a fresh store; a corrupt or unreadable one is
/// downgraded to a warning and an empty set, so the worst case is
/// re-fetching rows the store already holds.
pub fn hydrated_ids(path: &Path) -> FxHashSet<String> {
    if !path.exists() {
        return FxHashSet::default();
    }
    match read_id_column(path) {
        Ok(ids) => ids,
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            FxHashSet::default()
        }
    }
}

fn read_id_column(path: &Path) -> Result<FxHashSet<String>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = headers
        .iter()
        .position(|h| h == "id")
        .ok_or("no id column in output store")?;

    let mut ids = FxHashSet::default();
    for record in reader.records() {
        let record = record?;
        if let Some(field) = record.get(idx) {
            ids.insert(field.to_string());
        }
    }
    Ok(ids)
}

/// Ids recorded as permanently failed in earlier runs.
///
/// Same contract as [`hydrated_ids`]: missing file or read failure means
/// an empty set, never a fatal error.
pub fn failed_ids(path: &Path) -> FxHashSet<String> {
    if !path.exists() {
        return FxHashSet::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            FxHashSet::default()
        }
    }
}

/// Input ids minus (hydrated ∪ failed), truncated to `limit`, input order
/// preserved. A limit of zero or below yields an empty set.
pub fn work_set(
    all: &[String],
    hydrated: &FxHashSet<String>,
    failed: &FxHashSet<String>,
    limit: i64,
) -> Vec<String> {
    if limit <= 0 {
        return Vec::new();
    }
    all.iter()
        .filter(|id| !hydrated.contains(id.as_str()) && !failed.contains(id.as_str()))
        .take(limit as usize)
        .cloned()
        .collect()
}

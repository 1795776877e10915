//! Reconciler: given the current inventory and the current directory, downloads
//! missing artifacts and retires stale ones using the tombstone journal.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::download::{self, DownloadError};
use crate::inventory::{self, FetchError};
use crate::tombstones::{TombstoneError, TombstoneJournal};

const CANDIDATE_STALE_SUFFIXES: [&str; 3] = ["sd7", "sdz", "tmp"];

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("fetching inventory: {0}")]
    Fetch(#[from] FetchError),
    #[error("downloading {file_name}: {source}")]
    Download {
        file_name: String,
        #[source]
        source: DownloadError,
    },
    #[error("tombstone journal: {0}")]
    Tombstone(#[from] TombstoneError),
    #[error("reading directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("deleting {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run one reconciliation pass. `now` is an injected clock so tombstone timing is
/// deterministic under test.
pub fn sync_files(
    directory: &Path,
    client: &reqwest::blocking::Client,
    live_maps_url: &str,
    delete_after: i64,
    now: impl Fn() -> i64,
) -> Result<(), SyncError> {
    // Phase 1 -- acquire inventory.
    let inventory = inventory::fetch_inventory(client, live_maps_url)?;
    let live_names: std::collections::HashSet<&str> =
        inventory.iter().map(|entry| entry.file_name.as_str()).collect();

    // Phase 2 -- materialize missing artifacts, sequentially, in inventory order.
    for entry in &inventory {
        let destination = directory.join(&entry.file_name);
        if destination.exists() {
            continue;
        }
        info!(file = %entry.file_name, "downloading missing map");
        download::download_file(client, &entry.download_url, &destination, &entry.md5).map_err(|source| {
            SyncError::Download { file_name: entry.file_name.clone(), source }
        })?;
    }

    // Phase 3 -- deletions disabled.
    if delete_after < 0 {
        return Ok(());
    }

    // Phase 4 -- load tombstones.
    let previous = TombstoneJournal::load(directory)?;
    let mut current = previous.clone();

    // Phase 5 -- classify and sweep.
    let entries = fs::read_dir(directory)
        .map_err(|source| SyncError::ReadDir { path: directory.display().to_string(), source })?;
    let now = now();
    let mut still_present = std::collections::BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| SyncError::ReadDir { path: directory.display().to_string(), source })?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else { continue };

        if live_names.contains(file_name) {
            continue;
        }
        let is_candidate_stale = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CANDIDATE_STALE_SUFFIXES.contains(&ext));
        if !is_candidate_stale {
            continue;
        }

        still_present.insert(file_name.to_string());
        let first_absent = *current.0.entry(file_name.to_string()).or_insert(now);
        if now - first_absent > delete_after {
            info!(file = file_name, "deleting map absent for longer than the grace period");
            fs::remove_file(entry.path())
                .map_err(|source| SyncError::Delete { path: entry.path().display().to_string(), source })?;
            current.0.remove(file_name);
            still_present.remove(file_name);
        } else {
            debug!(file = file_name, first_absent, "candidate-stale, within grace period");
        }
    }
    // A file whose tombstone predates this pass but that no longer exists on disk
    // (e.g. removed manually) shouldn't linger in the journal either.
    current.0.retain(|name, _| still_present.contains(name));

    // Phase 6 -- persist only if changed.
    if current.save_if_changed(directory, &previous)? {
        debug!("tombstone journal updated");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;

    fn client() -> reqwest::blocking::Client {
        crate::http::build_client().unwrap()
    }

    #[test]
    fn idempotent_pass_over_unchanged_inventory_leaves_directory_untouched() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("comet_catcher.sd7"), b"payload").unwrap();

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/maps.json");
            then.status(200).json_body(serde_json::json!([
                {
                    "springName": "Comet Catcher",
                    "fileName": "comet_catcher.sd7",
                    "downloadURL": format!("{}/comet_catcher.sd7", server.base_url()),
                    "md5": "ignored-because-file-already-present",
                }
            ]));
        });

        let url = server.url("/maps.json");
        sync_files(dir.path(), &client(), &url, 14_400, || 1_000).unwrap();
        mock.assert_hits(1);
        assert!(dir.path().join("comet_catcher.sd7").exists());
        assert!(!dir.path().join("tombstones.json").exists());
    }

    #[test]
    fn candidate_stale_file_is_tombstoned_then_deleted_after_grace_period() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old_map.sd7"), b"stale").unwrap();

        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/maps.json");
            then.status(200).json_body(serde_json::json!([]));
        });
        let url = server.url("/maps.json");

        sync_files(dir.path(), &client(), &url, 300, || 1_000).unwrap();
        let journal = TombstoneJournal::load(dir.path()).unwrap();
        assert_eq!(journal.0.get("old_map.sd7"), Some(&1_000));
        assert!(dir.path().join("old_map.sd7").exists());

        sync_files(dir.path(), &client(), &url, 300, || 1_200).unwrap();
        assert!(dir.path().join("old_map.sd7").exists());

        sync_files(dir.path(), &client(), &url, 300, || 1_301).unwrap();
        assert!(!dir.path().join("old_map.sd7").exists());
    }

    #[test]
    fn foreign_file_is_never_touched() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"hello").unwrap();

        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/maps.json");
            then.status(200).json_body(serde_json::json!([]));
        });
        let url = server.url("/maps.json");

        sync_files(dir.path(), &client(), &url, 0, || 1_000_000).unwrap();
        assert!(dir.path().join("readme.txt").exists());
    }

    #[test]
    fn negative_delete_after_disables_deletion() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old_map.sd7"), b"stale").unwrap();

        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/maps.json");
            then.status(200).json_body(serde_json::json!([]));
        });
        let url = server.url("/maps.json");

        sync_files(dir.path(), &client(), &url, -1, || 1_000_000_000).unwrap();
        assert!(dir.path().join("old_map.sd7").exists());
        assert!(!dir.path().join("tombstones.json").exists());
    }
}

//! Tombstone journal: tracks when a candidate-stale file was first observed absent
//! from the inventory, so the reconciler can delete it once that absence has lasted
//! longer than the configured grace period.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

pub const FILE_NAME: &str = "tombstones.json";

/// Mapping from file name to the UNIX-epoch-seconds timestamp of first absence.
/// `BTreeMap` keeps serialized output stable so unchanged content really is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TombstoneJournal(pub BTreeMap<String, i64>);

#[derive(Debug, thiserror::Error)]
pub enum TombstoneError {
    #[error("reading {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid tombstone JSON: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("writing {path} failed: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl TombstoneJournal {
    /// Load the journal at `<directory>/tombstones.json`. A missing file is an empty
    /// journal; a malformed file is a fatal error that aborts the sync pass.
    pub fn load(directory: &Path) -> Result<Self, TombstoneError> {
        let path = directory.join(FILE_NAME);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(TombstoneError::Read { path: path.display().to_string(), source }),
        };
        let map: BTreeMap<String, i64> = serde_json::from_str(&contents)
            .map_err(|source| TombstoneError::Decode { path: path.display().to_string(), source })?;
        Ok(Self(map))
    }

    /// Persist the journal only if `self` differs from `previous`. Returns whether a
    /// write occurred.
    pub fn save_if_changed(&self, directory: &Path, previous: &Self) -> Result<bool, TombstoneError> {
        if self == previous {
            return Ok(false);
        }
        let path = directory.join(FILE_NAME);
        let contents = serde_json::to_string_pretty(&self.0).expect("BTreeMap<String, i64> always serializes");
        fs::write(&path, contents).map_err(|source| TombstoneError::Write { path: path.display().to_string(), source })?;
        Ok(true)
    }
}

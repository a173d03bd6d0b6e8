use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use plan_core::{RegulatorySnapshot, normalize_snapshot};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when reading a regulatory snapshot document.
#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    #[error("cannot read snapshot '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot document is not a JSON object")]
    NotAnObject,
}

/// Loader for cached regulatory snapshots.
///
/// The cache is a single JSON object as written by the catalog refresh job:
///
/// ```json
/// {
///   "checked_at": "2025-02-10T08:00:00+00:00",
///   "sources": {"opf": "https://...", "tax_systems": "https://..."},
///   "opf": [{"code": "IP", "title": "...", "tax_systems": ["USN_6", "PSN"]}],
///   "tax_systems": {"USN_6": {"code": "USN_6", "effective_rate": "0.06", "basis": "revenue"}}
/// }
/// ```
///
/// Only the outer shape is checked here; field-level leniency is the job of
/// [`normalize_snapshot`].
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Parse a snapshot document from any reader.
    ///
    /// Returns the raw payload, which must be a JSON object.
    pub fn read<R: Read>(reader: R) -> Result<Value, SnapshotLoadError> {
        let payload: Value = serde_json::from_reader(reader)?;
        if payload.is_object() {
            Ok(payload)
        } else {
            Err(SnapshotLoadError::NotAnObject)
        }
    }

    /// Read and normalize the snapshot stored at `path`.
    pub fn load_from_path(path: &Path) -> Result<RegulatorySnapshot, SnapshotLoadError> {
        let file = File::open(path).map_err(|source| SnapshotLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let payload = Self::read(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded regulatory snapshot");
        Ok(normalize_snapshot(&payload))
    }

    /// Load the snapshot at `path`, falling back to the built-in catalog.
    ///
    /// A missing path, a missing or unreadable file and a malformed document
    /// all yield the built-in snapshot; anything other than "no path given"
    /// is logged as a warning.
    pub fn load_or_default(path: Option<&Path>) -> RegulatorySnapshot {
        let Some(path) = path else {
            return builtin_snapshot();
        };

        match Self::load_from_path(path) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "using built-in regulatory catalog");
                builtin_snapshot()
            }
        }
    }
}

fn builtin_snapshot() -> RegulatorySnapshot {
    normalize_snapshot(&Value::Object(Default::default()))
}

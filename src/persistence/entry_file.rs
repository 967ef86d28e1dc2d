//! Per-fingerprint entry files.
//!
//! Each [`CorrelationEntry`] lives in its own JSON file, wrapped in an
//! [`EntryFile`] envelope carrying the schema version and save time.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fsync::{fsync_dir, fsync_file};
use crate::store::CorrelationEntry;
use crate::types::Fingerprint;

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum EntryFileError {
    /// Reading, writing or renaming the file failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a valid entry document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was written with another schema version.
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },

    /// Fingerprint is not usable as a file name.
    #[error("malformed fingerprint: {0:?}")]
    MalformedFingerprint(String),
}

pub type Result<T> = std::result::Result<T, EntryFileError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFile {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub entry: CorrelationEntry,
}

/// Returns `<state_dir>/fingerprints/<fp[0..2]>/<fp[2..4]>/<fp>.json`.
///
/// Rejects anything that isn't lowercase hex of at least four digits, since
/// the fingerprint becomes part of a path.
pub fn entry_path(state_dir: &Path, fingerprint: &Fingerprint) -> Result<PathBuf> {
    let fp = fingerprint.as_str();
    if !fingerprint.is_well_formed() || fp.len() < 4 {
        return Err(EntryFileError::MalformedFingerprint(fp.to_string()));
    }
    Ok(state_dir
        .join("fingerprints")
        .join(&fp[..2])
        .join(&fp[2..4])
        .join(format!("{fp}.json")))
}

/// Saves an entry atomically.
///
/// 1. Write to `<path>.tmp`
/// 2. fsync the temp file
/// 3. Rename over `<path>`
/// 4. fsync the parent directory
pub fn save_entry_atomic(path: &Path, entry: &CorrelationEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = EntryFile {
        schema_version: SCHEMA_VERSION,
        saved_at: Utc::now(),
        entry: entry.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&file)?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(&bytes)?;
        fsync_file(&tmp)?;
    }

    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }
    Ok(())
}

pub fn load_entry(path: &Path) -> Result<CorrelationEntry> {
    let bytes = std::fs::read(path)?;
    let file: EntryFile = serde_json::from_slice(&bytes)?;
    if file.schema_version != SCHEMA_VERSION {
        return Err(EntryFileError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: file.schema_version,
        });
    }
    Ok(file.entry)
}

/// Like [`load_entry`], but a missing file is `Ok(None)`.
pub fn try_load_entry(path: &Path) -> Result<Option<CorrelationEntry>> {
    match load_entry(path) {
        Ok(entry) => Ok(Some(entry)),
        Err(EntryFileError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

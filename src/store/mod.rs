//! Durable fingerprint → [`CorrelationEntry`] map.
//!
//! Entry files on disk are the only copy of the state; nothing is cached in
//! memory, so the process footprint does not grow with the number of
//! notifications ever seen. All operations run under one store-wide lock.
//! Every mutation is applied to a loaded copy and written atomically, so a
//! failed write leaves the file at the previous version.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, trace};

use crate::callback::CallbackResult;
use crate::host::BuildInfo;
use crate::notification::PushNotification;
use crate::persistence::{EntryFileError, entry_path, save_entry_atomic, try_load_entry};
use crate::types::{Fingerprint, JobName};

pub mod entry;

pub use entry::{CorrelationEntry, RunRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The entry file could not be read or written, or the fingerprint is
    /// not usable as a file name.
    #[error("entry file error: {0}")]
    File(#[from] EntryFileError),

    /// A callback was claimed for a fingerprint with no entry.
    #[error("no entry for fingerprint {0}")]
    UnknownFingerprint(Fingerprint),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug)]
pub struct CorrelationStore {
    state_dir: PathBuf,
    /// Serializes every read-modify-write.
    lock: Mutex<()>,
}

impl CorrelationStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        CorrelationStore {
            state_dir: state_dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn locked(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, fingerprint: &Fingerprint) -> Result<Option<CorrelationEntry>> {
        let path = entry_path(&self.state_dir, fingerprint)?;
        let loaded = try_load_entry(&path)?;
        if loaded.is_some() {
            trace!(fingerprint = %fingerprint.short(), "Loaded entry from disk");
        }
        Ok(loaded)
    }

    fn save(&self, entry: CorrelationEntry) -> Result<CorrelationEntry> {
        let path = entry_path(&self.state_dir, entry.fingerprint())?;
        save_entry_atomic(&path, &entry)?;
        Ok(entry)
    }

    /// Applies `f` to the entry for `notification`, creating it if absent, and persists.
    fn update(
        &self,
        notification: &PushNotification,
        f: impl FnOnce(&mut CorrelationEntry),
    ) -> Result<CorrelationEntry> {
        let _guard = self.locked();
        let mut entry = self
            .load(notification.fingerprint())?
            .unwrap_or_else(|| CorrelationEntry::new(notification.clone()));
        f(&mut entry);
        self.save(entry)
    }

    /// Returns the entry for `notification`, creating and persisting it if absent.
    pub fn get_or_create(&self, notification: &PushNotification) -> Result<CorrelationEntry> {
        let _guard = self.locked();
        match self.load(notification.fingerprint())? {
            Some(entry) => Ok(entry),
            None => {
                debug!(notification = %notification, "Creating correlation entry");
                self.save(CorrelationEntry::new(notification.clone()))
            }
        }
    }

    /// Ensures `job` is tracked for `notification`.
    pub fn triggered(
        &self,
        notification: &PushNotification,
        job: &JobName,
    ) -> Result<CorrelationEntry> {
        self.update(notification, |entry| {
            entry.ensure_run(job);
        })
    }

    /// Records that `build` started.
    pub fn started(
        &self,
        notification: &PushNotification,
        build: &BuildInfo,
    ) -> Result<CorrelationEntry> {
        self.update(notification, |entry| entry.update_run(build))
    }

    /// Records that `build` finished, together with its result.
    pub fn finalized(
        &self,
        notification: &PushNotification,
        build: &BuildInfo,
    ) -> Result<CorrelationEntry> {
        self.update(notification, |entry| entry.update_run(build))
    }

    /// Stops tracking `job`.
    ///
    /// Returns `None` if there is no entry for the notification. An entry
    /// whose last record is removed is kept.
    pub fn removed(
        &self,
        notification: &PushNotification,
        job: &JobName,
    ) -> Result<Option<CorrelationEntry>> {
        let _guard = self.locked();
        let Some(mut entry) = self.load(notification.fingerprint())? else {
            return Ok(None);
        };
        if !entry.remove_run(job) {
            return Ok(Some(entry));
        }
        self.save(entry).map(Some)
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CorrelationEntry>> {
        let _guard = self.locked();
        self.load(fingerprint)
    }

    /// Stores `result` as the entry's callback unless one was stored before.
    ///
    /// Returns true only for the call that stored it; the result is on disk
    /// before this returns.
    pub fn claim_callback(&self, fingerprint: &Fingerprint, result: CallbackResult) -> Result<bool> {
        let _guard = self.locked();
        let Some(mut entry) = self.load(fingerprint)? else {
            return Err(StoreError::UnknownFingerprint(fingerprint.clone()));
        };
        if !entry.set_callback(result) {
            return Ok(false);
        }
        self.save(entry)?;
        Ok(true)
    }
}

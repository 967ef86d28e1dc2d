//! fsync helpers.
//!
//! A rename is only durable once the directory holding it has been synced,
//! so atomic writes sync both the file and its parent.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Flushes a file's contents and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Flushes a directory's entries to disk.
///
/// Must be given a directory; the path is opened read-only.
pub fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

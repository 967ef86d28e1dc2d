//! Durable storage for correlation entries.
//!
//! # File Layout
//!
//! ```text
//! <state_dir>/fingerprints/
//!   ab/cd/abcd....json   # one file per fingerprint, sharded by its first four hex digits
//! ```
//!
//! Files are replaced atomically (write temp, fsync, rename, fsync dir), so a
//! reader sees either the previous or the new entry, never a torn write.

pub mod entry_file;
pub mod fsync;

pub use entry_file::{
    EntryFile, EntryFileError, SCHEMA_VERSION, entry_path, load_entry, save_entry_atomic,
    try_load_entry,
};
pub use fsync::{fsync_dir, fsync_file};
